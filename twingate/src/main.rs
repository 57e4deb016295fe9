use std::env;
use std::path::PathBuf;
use tfplug::grpc::ProviderServer;
use twingate::TwingateProvider;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    tracing_subscriber::fmt()
        .with_max_level(tracing::Level::INFO)
        .with_writer(std::io::stderr)
        .init();

    // TLS material for the plugin handshake; paths are overridable for
    // local development setups.
    let cert_path = env::var("TWINGATE_PROVIDER_CERT")
        .map(PathBuf::from)
        .unwrap_or_else(|_| PathBuf::from("./certs/localhost.pem"));
    let key_path = env::var("TWINGATE_PROVIDER_KEY")
        .map(PathBuf::from)
        .unwrap_or_else(|_| PathBuf::from("./certs/localhost-key.pem"));

    let provider = TwingateProvider::new();
    let server = ProviderServer::new(provider, cert_path, key_path);

    server.run().await?;

    Ok(())
}
