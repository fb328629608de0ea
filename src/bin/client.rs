use clap::Parser;
use norikv_lite::config::{ClientArgs, ClientCommand};
use norikv_lite::wire::{ErrorResponse, GetResponse, SetRequest};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::init();
    let args = ClientArgs::parse();
    let client = reqwest::Client::new();

    let result = match args.command {
        ClientCommand::Set { key, value } => {
            let resp = client
                .post(format!("{}/set", args.server))
                .json(&SetRequest { key, value })
                .send()
                .await?;
            handle_unit_response(resp).await
        }
        ClientCommand::Get { key } => {
            let resp = client
                .get(format!("{}/get", args.server))
                .query(&[("key", &key)])
                .send()
                .await?;
            handle_get_response(resp).await
        }
        ClientCommand::Delete { key } => {
            let resp = client
                .delete(format!("{}/delete", args.server))
                .query(&[("key", &key)])
                .send()
                .await?;
            handle_unit_response(resp).await
        }
    };

    if let Err(message) = result {
        eprintln!("error: {message}");
        std::process::exit(1);
    }
    Ok(())
}

async fn handle_unit_response(resp: reqwest::Response) -> Result<(), String> {
    if resp.status().is_success() {
        println!("ok");
        Ok(())
    } else {
        Err(error_message(resp).await)
    }
}

async fn handle_get_response(resp: reqwest::Response) -> Result<(), String> {
    if resp.status().is_success() {
        match resp.json::<GetResponse>().await {
            Ok(body) => {
                println!("{}", body.value);
                Ok(())
            }
            Err(err) => Err(err.to_string()),
        }
    } else {
        Err(error_message(resp).await)
    }
}

async fn error_message(resp: reqwest::Response) -> String {
    let status = resp.status();
    match resp.json::<ErrorResponse>().await {
        Ok(body) => format!("{status}: {}", body.error),
        Err(_) => format!("{status}"),
    }
}
