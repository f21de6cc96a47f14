// Copyright (c) 2025 Unfolded Circle ApS, Markus Zehnder <markus.z@unfoldedcircle.com>
// SPDX-License-Identifier: MPL-2.0

//! Byte stream transports to the radar UART.

use crate::errors::ServiceError;
use log::info;
use tokio::fs::OpenOptions;
use tokio::io::{AsyncRead, AsyncWrite};
use tokio::net::TcpStream;
use url::Url;

/// Bidirectional byte stream to the radar module.
pub trait Transport: AsyncRead + AsyncWrite + Unpin + 'static {}

impl<T: AsyncRead + AsyncWrite + Unpin + 'static> Transport for T {}

pub type BoxedTransport = Box<dyn Transport>;

/// Open the radar connection given in `url`.
///
/// - `tcp://host:port`: serial-to-network bridge.
/// - `serial:///dev/ttyUSB0`: local character device. Line settings (115200 8N1) must be set up
///   beforehand, e.g. with `stty`.
pub async fn open_transport(url: &Url) -> Result<BoxedTransport, ServiceError> {
    match url.scheme() {
        "tcp" => {
            let host = url
                .host_str()
                .map(|h| h.trim_start_matches('[').trim_end_matches(']'))
                .filter(|h| !h.is_empty())
                .ok_or_else(|| ServiceError::BadRequest(format!("Missing host in {url}")))?;
            let port = url
                .port()
                .ok_or_else(|| ServiceError::BadRequest(format!("Missing port in {url}")))?;
            let stream = TcpStream::connect((host, port)).await.map_err(|e| {
                ServiceError::InternalServerError(format!("Error connecting to {url}: {e}"))
            })?;
            stream.set_nodelay(true)?;
            info!("Connected to radar bridge {host}:{port}");
            Ok(Box::new(stream))
        }
        "serial" => {
            let path = url.path();
            let open_err = |e: std::io::Error| {
                ServiceError::InternalServerError(format!("Error opening {path}: {e}"))
            };
            // a tokio file runs one operation at a time: separate handles keep writes
            // independent of the pending read
            let reader = OpenOptions::new()
                .read(true)
                .open(path)
                .await
                .map_err(open_err)?;
            let writer = OpenOptions::new()
                .write(true)
                .open(path)
                .await
                .map_err(open_err)?;
            info!("Opened radar device {path}");
            Ok(Box::new(tokio::io::join(reader, writer)))
        }
        scheme => Err(ServiceError::BadRequest(format!(
            "Unsupported radar transport: {scheme}"
        ))),
    }
}
