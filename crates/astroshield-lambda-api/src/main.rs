//! AWS Lambda function serving the AstroShield API.

#[tokio::main]
async fn main() -> Result<(), lambda_runtime::Error> {
    astroshield_lambda_api::run().await
}
