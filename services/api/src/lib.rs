mod cli;
mod commands;
mod infra;
mod routes;
mod server;

use icu_ward::error::AppError;

pub async fn run() -> Result<(), AppError> {
    cli::run().await
}
