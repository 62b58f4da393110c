use std::io;
use std::net::{Ipv4Addr, SocketAddr};

use tokio::net::TcpListener;

const DEFAULT_PORT: u16 = 8000;

/// Port from the `PORT` variable, if set.
fn port_from(raw: Option<String>) -> io::Result<u16> {
    match raw {
        None => Ok(DEFAULT_PORT),
        Some(raw) => raw.trim().parse().map_err(|e| {
            io::Error::new(io::ErrorKind::InvalidInput, format!("invalid PORT {raw:?}: {e}"))
        }),
    }
}

#[tokio::main]
async fn main() -> io::Result<()> {
    let port = port_from(std::env::var("PORT").ok())?;
    let listener = TcpListener::bind(SocketAddr::from((Ipv4Addr::LOCALHOST, port))).await?;
    eprintln!("campus mock API serving on http://{}", listener.local_addr()?);
    mock_server::run(listener).await
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn port_defaults_and_parses() {
        assert_eq!(port_from(None).unwrap(), 8000);
        assert_eq!(port_from(Some(" 9100 ".to_string())).unwrap(), 9100);
    }

    #[test]
    fn bad_port_is_rejected() {
        let err = port_from(Some("eighty".to_string())).unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::InvalidInput);
    }
}
