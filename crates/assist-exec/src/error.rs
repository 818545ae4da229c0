use snafu::Snafu;

#[derive(Debug, Snafu)]
#[snafu(visibility(pub(crate)))]
pub enum GatewayError {
    #[snafu(display("request text is empty"))]
    EmptyRequest,
    #[snafu(display("failed to start {provider} CLI"))]
    Spawn {
        provider: &'static str,
        source: std::io::Error,
    },
    #[snafu(display("{provider} CLI exited with {status}: {stderr}"))]
    Exit {
        provider: &'static str,
        status: String,
        stderr: String,
    },
}

pub type GatewayResult<T> = Result<T, GatewayError>;
