mod config;
mod error;
mod file_system;
mod handlers;
mod markdown;
mod models;
mod page;
mod tree_view;

use actix_web::{middleware, web, App, HttpServer};
use config::{Config, TlsPaths};
use handlers::AppState;
use log::{error, info, warn};
use rustls::ServerConfig;
use rustls_pemfile::{certs, pkcs8_private_keys};
use std::env;
use std::fs::File as FsFile;
use std::io::{self, BufReader};

fn load_tls_config(tls: &TlsPaths) -> io::Result<ServerConfig> {
    let cert_file = &mut BufReader::new(FsFile::open(&tls.cert_path)?);
    let key_file = &mut BufReader::new(FsFile::open(&tls.key_path)?);
    let cert_chain = certs(cert_file).collect::<Result<Vec<_>, _>>()?;
    let mut keys = pkcs8_private_keys(key_file).collect::<Result<Vec<_>, _>>()?;

    if keys.is_empty() {
        return Err(io::Error::new(io::ErrorKind::Other, "No private keys found in key file"));
    }

    ServerConfig::builder()
        .with_no_client_auth()
        .with_single_cert(cert_chain, keys.remove(0).into())
        .map_err(|e| io::Error::new(io::ErrorKind::Other, e))
}

#[actix_web::main]
async fn main() -> io::Result<()> {
    dotenv::dotenv().ok();
    // Override the log level with RUST_LOG, e.g. `RUST_LOG=debug`.
    if env::var("RUST_LOG").is_err() {
        env::set_var("RUST_LOG", "info");
    }
    env_logger::init();

    let config = match Config::from_env() {
        Ok(config) => config,
        Err(e) => {
            error!("Invalid configuration: {}", e);
            return Err(io::Error::new(io::ErrorKind::InvalidInput, e));
        }
    };
    let addr = config.bind_addr();
    let tls = config.tls.clone();
    info!("Serving markdown files from {}", config.base_dir.display());
    if config.allow_raw_html {
        warn!("ALLOW_RAW_HTML is set: raw HTML inside documents is passed through unescaped.");
    }

    let state = web::Data::new(AppState::new(config));
    let mut http_server = HttpServer::new(move || {
        App::new()
            .app_data(state.clone())
            .wrap(middleware::Logger::default())
            .configure(handlers::configure)
    });

    match tls {
        Some(tls) if tls.cert_path.exists() && tls.key_path.exists() => {
            info!("Attempting to start HTTPS server...");
            let server_config = load_tls_config(&tls)?;
            info!("Successfully configured TLS. Binding to https://{}", addr);
            http_server = http_server.bind_rustls_0_23(addr, server_config)?;
        }
        Some(_) => {
            warn!("CERT_PATH or KEY_PATH points to a non-existent file. Starting without HTTPS.");
            info!("Server running at http://{}", addr);
            http_server = http_server.bind(addr)?;
        }
        None => {
            info!("Server running at http://{}", addr);
            http_server = http_server.bind(addr)?;
        }
    }

    http_server.run().await
}
