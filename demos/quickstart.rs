/// Quickstart example: minimal end-to-end Synapse sandbox flow.
///
/// Demonstrates: create a user, authenticate, open a deposit node, list the
/// user's nodes, send a transaction and read it back.
///
/// Requires `SYNAPSE_CLIENT_ID`, `SYNAPSE_CLIENT_SECRET` and
/// `SYNAPSE_FINGERPRINT` in the environment.
use serde_json::json;
use synapse_sdk::{ClientConfig, CreateNodeResponse, QueryOptions, SynapseClient};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let client_id = std::env::var("SYNAPSE_CLIENT_ID")?;
    let client_secret = std::env::var("SYNAPSE_CLIENT_SECRET")?;
    let fingerprint = std::env::var("SYNAPSE_FINGERPRINT")?;

    let config = ClientConfig::new(client_id, client_secret, "127.0.0.1").fingerprint(fingerprint);
    let mut client = SynapseClient::new(config)?;

    // 1. Create a user
    println!("Creating user...");
    let mut user = client
        .create_user(
            json!({
                "logins": [{ "email": "quickstart@synapsefi.com" }],
                "phone_numbers": ["901.111.1111"],
                "legal_names": ["Quickstart User"],
                "extra": { "supp_id": "quickstart-1", "cip_tag": 1, "is_business": false },
            }),
            None,
        )
        .await?;
    println!("User: {}", user.id);

    // 2. Exchange the refresh token for an oauth key
    let token = client.authenticate(&mut user, None).await?;
    println!("Authenticated, expires in {:?}s", token.expires_in);

    // 3. Open a deposit account
    println!("Creating deposit node...");
    let created = client
        .create_node(
            &mut user,
            json!({ "type": "DEPOSIT-US", "info": { "nickname": "Quickstart Deposit" } }),
            None,
        )
        .await?;
    let node_id = match created {
        CreateNodeResponse::Nodes(nodes) => match nodes.nodes.first() {
            Some(node) => node.id.clone(),
            None => return Err("node creation returned no nodes".into()),
        },
        CreateNodeResponse::AccessToken(mfa) => {
            println!("Unexpected MFA challenge: {:?}", mfa.message);
            return Ok(());
        }
    };
    println!("Node: {node_id}");

    // 4. List the user's nodes
    let nodes = client
        .get_user_nodes(&mut user, &QueryOptions::default())
        .await?;
    println!("User nodes ({:?}):", nodes.node_count);
    for node in &nodes.nodes {
        println!(
            "  {} {} {}",
            node.id,
            node.node_type.as_deref().unwrap_or("?"),
            node.nickname().unwrap_or("")
        );
    }

    // 5. Send a transaction to a second deposit node
    let Some(target) = nodes.nodes.iter().find(|n| n.id != node_id) else {
        println!("\nCreate a second node to try a transaction.");
        return Ok(());
    };
    println!("\nSending 10.00 USD to {}...", target.id);
    let trans = client
        .create_transaction(
            &mut user,
            &node_id,
            json!({
                "to": { "type": "DEPOSIT-US", "id": target.id },
                "amount": { "amount": 10.00, "currency": "USD" },
                "extra": { "ip": "127.0.0.1", "note": "quickstart" },
            }),
            Some("quickstart-trans-1"),
        )
        .await?;
    println!(
        "Transaction {}: {} {} ({})",
        trans.id,
        trans.amount.amount,
        trans.amount.currency,
        trans.status().unwrap_or("?")
    );

    // 6. Read it back
    let trans = client
        .get_transaction(&mut user, &node_id, &trans.id)
        .await?;
    println!("Current status: {}", trans.status().unwrap_or("?"));

    Ok(())
}
