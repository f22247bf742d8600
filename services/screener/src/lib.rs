mod cli;
mod demo;
mod infra;
mod screen;

use cv_screening::error::AppError;

pub async fn run() -> Result<(), AppError> {
    cli::run().await
}
