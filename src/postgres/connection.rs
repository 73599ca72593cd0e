// ABOUTME: PostgreSQL connection utilities and the connectivity probe
// ABOUTME: Handles driver configuration, TLS setup, and connection lifecycle

use crate::config::{ConnectionConfig, SslMode};
use crate::error::{MigrateError, Result};
use crate::migration::ConnectionProber;
use native_tls::TlsConnector;
use postgres_native_tls::MakeTlsConnector;
use std::time::Duration;
use tokio_postgres::config::SslMode as PgSslMode;
use tokio_postgres::{Client, Config};

/// Build the driver configuration for a connection descriptor.
///
/// TCP keepalives are always enabled so long dumps through load balancers
/// don't see the connection reaped. Without an explicit `sslmode`, TLS is
/// attempted and the connection falls back to plaintext if the server declines.
/// `verify-ca` and `verify-full` require TLS; the verification itself is done
/// by the connector from [`tls_connector`].
pub fn pg_config(config: &ConnectionConfig, timeout: Option<Duration>) -> Config {
    let mut pg = Config::new();
    pg.host(config.host())
        .port(config.port())
        .dbname(config.database())
        .user(config.username())
        .password(config.password())
        .application_name("postgres-migrator")
        .keepalives(true)
        .keepalives_idle(Duration::from_secs(60))
        .ssl_mode(match config.ssl_mode() {
            Some(SslMode::Disable) => PgSslMode::Disable,
            Some(SslMode::Require | SslMode::VerifyCa | SslMode::VerifyFull) => {
                PgSslMode::Require
            }
            Some(SslMode::Prefer) | None => PgSslMode::Prefer,
        });

    if let Some(limit) = timeout {
        pg.connect_timeout(limit);
    }

    pg
}

/// Which parts of the server certificate are checked during the TLS handshake
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct CertificateChecks {
    chain: bool,
    hostname: bool,
}

impl CertificateChecks {
    /// Same rules as libpq: `prefer` and `require` encrypt without verifying,
    /// so self-signed server certificates are accepted.
    fn for_mode(ssl_mode: Option<SslMode>) -> Self {
        match ssl_mode {
            Some(mode) => Self {
                chain: mode.verifies_certificate(),
                hostname: mode.verifies_hostname(),
            },
            None => Self {
                chain: false,
                hostname: false,
            },
        }
    }
}

/// Build the TLS connector matching the descriptor's `sslmode`
pub fn tls_connector(ssl_mode: Option<SslMode>) -> native_tls::Result<TlsConnector> {
    let checks = CertificateChecks::for_mode(ssl_mode);
    TlsConnector::builder()
        .danger_accept_invalid_certs(!checks.chain)
        .danger_accept_invalid_hostnames(!checks.hostname)
        .build()
}

/// Operator hint for common connection failures
fn connection_hint(error_msg: &str) -> Option<&'static str> {
    if error_msg.contains("password authentication failed") {
        Some("Please verify your database credentials.")
    } else if error_msg.contains("database") && error_msg.contains("does not exist") {
        Some("Please create the database first or check the database name.")
    } else if error_msg.contains("Connection refused") || error_msg.contains("could not connect")
    {
        Some("Check that the host and port are correct and the server is running.")
    } else if error_msg.contains("no pg_hba.conf entry") {
        Some("The server's pg_hba.conf does not allow connections from this host.")
    } else if error_msg.contains("SSL") || error_msg.contains("TLS") {
        Some("Check the sslmode setting for this server.")
    } else {
        None
    }
}

/// Connect to PostgreSQL with TLS support
///
/// The connection task is spawned onto the runtime and ends when the returned
/// client is dropped.
///
/// # Errors
///
/// - `ConnectionFailed` for any driver-level failure (authentication,
///   unreachable host, missing database, TLS); the causes are not distinguished
///   beyond the message text
/// - `Timeout` if `timeout` elapses before the connection is established
pub async fn connect(config: &ConnectionConfig, timeout: Option<Duration>) -> Result<Client> {
    let failed = |message: String| MigrateError::ConnectionFailed {
        target: config.to_string(),
        message,
    };

    let connector = tls_connector(config.ssl_mode())
        .map_err(|e| failed(format!("Failed to build TLS connector: {}", e)))?;
    let tls = MakeTlsConnector::new(connector);

    let pg = pg_config(config, timeout);
    let connecting = pg.connect(tls);
    let connected = match timeout {
        Some(limit) => tokio::time::timeout(limit, connecting)
            .await
            .map_err(|_| MigrateError::Timeout {
                operation: format!("connecting to {}", config),
                after: limit,
            })?,
        None => connecting.await,
    };

    let (client, connection) = connected.map_err(|e| {
        let error_msg = e.to_string();
        match connection_hint(&error_msg) {
            Some(hint) => failed(format!("{}\n{}", error_msg, hint)),
            None => failed(error_msg),
        }
    })?;

    tokio::spawn(async move {
        if let Err(e) = connection.await {
            tracing::error!("Connection error: {}", e);
        }
    });

    Ok(client)
}

/// Open a connection and immediately release it.
///
/// Logs the outcome either way; used both by the `test` action and as the
/// precondition gate inside a migration.
pub async fn test_connection(config: &ConnectionConfig, timeout: Option<Duration>) -> Result<()> {
    match connect(config, timeout).await {
        Ok(client) => {
            drop(client);
            tracing::info!("✓ Successfully connected to {}", config);
            Ok(())
        }
        Err(e) => {
            tracing::error!("❌ Failed to connect to {}", config);
            tracing::error!("Error: {}", e);
            Err(e)
        }
    }
}

/// Connectivity probe backed by a real database connection
#[derive(Debug, Clone, Default)]
pub struct PgProber {
    timeout: Option<Duration>,
}

impl PgProber {
    pub fn new(timeout: Option<Duration>) -> Self {
        Self { timeout }
    }
}

impl ConnectionProber for PgProber {
    async fn probe(&self, config: &ConnectionConfig) -> Result<()> {
        test_connection(config, self.timeout).await
    }
}
