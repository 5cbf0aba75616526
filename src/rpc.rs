//! gRPC plumbing shared by the lnd and tapd adapters: TLS with the node's
//! self-signed certificate and a hex macaroon on every request.

use std::path::Path;

use anyhow::{Context as _, Result};
use tonic::metadata::{Ascii, MetadataValue};
use tonic::service::Interceptor;
use tonic::service::interceptor::InterceptedService;
use tonic::transport::{Certificate, Channel, ClientTlsConfig};
use tonic::{Request, Status};

pub type AuthedChannel = InterceptedService<Channel, MacaroonInterceptor>;

const DEFAULT_TLS_DOMAIN: &str = "localhost";

#[derive(Debug, Clone)]
pub struct NodeCredentials {
    pub grpc_addr: String,
    pub tls_cert_pem: Vec<u8>,
    pub macaroon_hex: String,
    pub tls_domain: String,
}

impl NodeCredentials {
    pub fn load(grpc_addr: &str, tls_cert_path: &Path, macaroon_path: &Path) -> Result<Self> {
        let tls_cert_pem = std::fs::read(tls_cert_path)
            .with_context(|| format!("read tls cert {}", tls_cert_path.display()))?;
        let macaroon = std::fs::read(macaroon_path)
            .with_context(|| format!("read macaroon {}", macaroon_path.display()))?;
        if macaroon.is_empty() {
            anyhow::bail!("macaroon {} is empty", macaroon_path.display());
        }

        Ok(Self {
            grpc_addr: grpc_addr.to_string(),
            tls_cert_pem,
            macaroon_hex: hex::encode(macaroon),
            tls_domain: DEFAULT_TLS_DOMAIN.to_string(),
        })
    }

    pub fn endpoint_uri(&self) -> String {
        if self.grpc_addr.starts_with("https://") || self.grpc_addr.starts_with("http://") {
            self.grpc_addr.clone()
        } else {
            format!("https://{}", self.grpc_addr)
        }
    }
}

#[derive(Debug, Clone)]
pub struct MacaroonInterceptor {
    macaroon: MetadataValue<Ascii>,
}

impl MacaroonInterceptor {
    pub fn new(macaroon_hex: &str) -> Result<Self> {
        let macaroon = macaroon_hex
            .parse::<MetadataValue<Ascii>>()
            .map_err(|e| anyhow::anyhow!("macaroon is not valid metadata: {e}"))?;
        Ok(Self { macaroon })
    }
}

impl Interceptor for MacaroonInterceptor {
    fn call(&mut self, mut request: Request<()>) -> Result<Request<()>, Status> {
        request
            .metadata_mut()
            .insert("macaroon", self.macaroon.clone());
        Ok(request)
    }
}

pub async fn connect(creds: &NodeCredentials) -> Result<(Channel, MacaroonInterceptor)> {
    let interceptor = MacaroonInterceptor::new(&creds.macaroon_hex)?;
    let tls = ClientTlsConfig::new()
        .ca_certificate(Certificate::from_pem(&creds.tls_cert_pem))
        .domain_name(creds.tls_domain.clone());

    let uri = creds.endpoint_uri();
    let channel = Channel::from_shared(uri.clone())
        .with_context(|| format!("parse grpc endpoint {uri}"))?
        .tls_config(tls)
        .context("configure tls")?
        .connect()
        .await
        .with_context(|| format!("connect {uri}"))?;

    Ok((channel, interceptor))
}
