//! Purpose: Perform the raw HTTP GET and hand back an owned response.
//! Exports: `Transport`, `HttpResponse`, `UreqTransport`.
//! Role: The seam between request logic and the network; fakes plug in here.
//! Invariants: Failures before a response exists are `ErrorKind::Connectivity`.
//! Invariants: Error statuses are returned as responses, not errors; callers decide.
//! Invariants: Dropping an `HttpResponse` releases its connection.
use std::io::Read;
use std::sync::Arc;

use rustls::client::danger::{HandshakeSignatureValid, ServerCertVerified, ServerCertVerifier};
use rustls::pki_types::{CertificateDer, ServerName, UnixTime};
use rustls::{DigitallySignedStruct, Error as TlsError, SignatureScheme};
use tracing::debug;

use super::config::ApiConfig;
use crate::core::error::{Error, ErrorKind};

pub type Body = Box<dyn Read + Send>;

pub trait Transport {
    fn get(&self, url: &str, headers: &[(String, String)]) -> Result<HttpResponse, Error>;
}

impl<T: Transport + ?Sized> Transport for &T {
    fn get(&self, url: &str, headers: &[(String, String)]) -> Result<HttpResponse, Error> {
        (**self).get(url, headers)
    }
}

pub struct HttpResponse {
    status: u16,
    reason: String,
    body: Body,
}

impl HttpResponse {
    pub fn new(status: u16, reason: impl Into<String>, body: Body) -> Self {
        Self {
            status,
            reason: reason.into(),
            body,
        }
    }

    pub fn status(&self) -> u16 {
        self.status
    }

    pub fn reason(&self) -> &str {
        &self.reason
    }

    pub fn is_error(&self) -> bool {
        self.status >= 400
    }

    pub fn read_body(&mut self) -> Result<Vec<u8>, Error> {
        let mut out = Vec::new();
        self.body.read_to_end(&mut out).map_err(|err| {
            Error::new(ErrorKind::Request)
                .with_message(format!("failed to read response body: {err}"))
                .with_status(self.status)
                .with_source(err)
        })?;
        Ok(out)
    }
}

impl std::fmt::Debug for HttpResponse {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HttpResponse")
            .field("status", &self.status)
            .field("reason", &self.reason)
            .finish_non_exhaustive()
    }
}

#[derive(Clone)]
pub struct UreqTransport {
    agent: ureq::Agent,
}

#[derive(Debug)]
struct AcceptAllServerCertVerifier;

impl ServerCertVerifier for AcceptAllServerCertVerifier {
    fn verify_server_cert(
        &self,
        _end_entity: &CertificateDer<'_>,
        _intermediates: &[CertificateDer<'_>],
        _server_name: &ServerName<'_>,
        _ocsp_response: &[u8],
        _now: UnixTime,
    ) -> Result<ServerCertVerified, TlsError> {
        Ok(ServerCertVerified::assertion())
    }

    fn verify_tls12_signature(
        &self,
        _message: &[u8],
        _cert: &CertificateDer<'_>,
        _dss: &DigitallySignedStruct,
    ) -> Result<HandshakeSignatureValid, TlsError> {
        Ok(HandshakeSignatureValid::assertion())
    }

    fn verify_tls13_signature(
        &self,
        _message: &[u8],
        _cert: &CertificateDer<'_>,
        _dss: &DigitallySignedStruct,
    ) -> Result<HandshakeSignatureValid, TlsError> {
        Ok(HandshakeSignatureValid::assertion())
    }

    fn supported_verify_schemes(&self) -> Vec<SignatureScheme> {
        rustls::crypto::aws_lc_rs::default_provider()
            .signature_verification_algorithms
            .supported_schemes()
    }
}

impl UreqTransport {
    pub fn new(config: &ApiConfig) -> Self {
        let mut builder = ureq::AgentBuilder::new();
        if let Some(timeout) = config.timeout() {
            builder = builder.timeout(timeout);
        }
        if config.tls_skip_verify() {
            debug!("tls certificate verification disabled");
            let _ = rustls::crypto::aws_lc_rs::default_provider().install_default();
            let tls_config = rustls::ClientConfig::builder()
                .dangerous()
                .with_custom_certificate_verifier(Arc::new(AcceptAllServerCertVerifier))
                .with_no_client_auth();
            builder = builder.tls_config(Arc::new(tls_config));
        }
        Self {
            agent: builder.build(),
        }
    }
}

impl Transport for UreqTransport {
    fn get(&self, url: &str, headers: &[(String, String)]) -> Result<HttpResponse, Error> {
        let mut request = self.agent.get(url);
        for (name, value) in headers {
            request = request.set(name, value);
        }
        match request.call() {
            Ok(resp) => Ok(into_http_response(resp)),
            Err(ureq::Error::Status(_, resp)) => Ok(into_http_response(resp)),
            Err(ureq::Error::Transport(err)) => Err(transport_error(err)),
        }
    }
}

fn into_http_response(resp: ureq::Response) -> HttpResponse {
    let status = resp.status();
    let reason = resp.status_text().to_string();
    HttpResponse::new(status, reason, Box::new(resp.into_reader()))
}

fn transport_error(err: ureq::Transport) -> Error {
    let kind = match err.kind() {
        ureq::ErrorKind::Dns
        | ureq::ErrorKind::ConnectionFailed
        | ureq::ErrorKind::Io
        | ureq::ErrorKind::ProxyConnect => ErrorKind::Connectivity,
        _ => ErrorKind::Request,
    };
    Error::new(kind)
        .with_message(err.to_string())
        .with_source(err)
}
