/// Two-factor example: register a new device fingerprint for an existing user.
///
/// Demonstrates: the 202 "fingerprint not registered" answer, choosing a
/// device for the PIN, confirming the PIN and making an authenticated call.
///
/// Requires `SYNAPSE_CLIENT_ID`, `SYNAPSE_CLIENT_SECRET`, `SYNAPSE_FINGERPRINT`
/// and `SYNAPSE_USER_ID` in the environment.
use std::io::BufRead;

use synapse_sdk::{ClientConfig, QueryOptions, SynapseClient, SynapseError};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let client_id = std::env::var("SYNAPSE_CLIENT_ID")?;
    let client_secret = std::env::var("SYNAPSE_CLIENT_SECRET")?;
    let fingerprint = std::env::var("SYNAPSE_FINGERPRINT")?;
    let user_id = std::env::var("SYNAPSE_USER_ID")?;

    let config = ClientConfig::new(client_id, client_secret, "127.0.0.1").fingerprint(fingerprint);
    let mut client = SynapseClient::new(config)?;
    let mut user = client.get_user(&user_id, false).await?;

    // 1. Try a plain refresh. An unknown fingerprint answers 202 with devices.
    match client.authenticate(&mut user, None).await {
        Ok(_) => {
            println!("Fingerprint already registered.");
        }
        Err(SynapseError::Unknown(api)) if api.http_code == 202 => {
            println!("{}", api.message);
            let devices = api.response["phone_numbers"]
                .as_array()
                .cloned()
                .unwrap_or_default();
            let Some(device) = devices.first().and_then(|d| d.as_str()) else {
                return Err("no 2FA device on file".into());
            };

            // 2. Ask for a PIN on the first device
            println!("Sending PIN to {device}...");
            client.select_2fa_device(&mut user, device).await?;

            // 3. Confirm the PIN read from stdin
            println!("Enter PIN:");
            let mut pin = String::new();
            std::io::stdin().lock().read_line(&mut pin)?;
            client.confirm_2fa_pin(&mut user, pin.trim()).await?;
            println!("Device registered.");
        }
        Err(e) => return Err(e.into()),
    }

    // 4. Authenticated call
    let nodes = client
        .get_user_nodes(&mut user, &QueryOptions::default())
        .await?;
    println!("User {} has {} node(s)", user.id, nodes.nodes.len());

    Ok(())
}
