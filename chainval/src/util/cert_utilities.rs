//! Utility functions shared by the certificate parser, chain builder, revocation checker and
//! trust registry

use std::fs::File;
use std::io::Read;
use std::path::Path;
use std::str;

use log::{debug, error};
use subtle_encoding::hex;
use url::Url;

use crate::util::error::*;

/// `buffer_to_hex` takes a byte array and returns a string featuring upper case ASCII hex characters
/// (without commas, spaces, or brackets). This is the canonical encoding used for key identifiers
/// held in a [`TrustRegistry`](../../source/trust_registry/struct.TrustRegistry.html).
pub fn buffer_to_hex(buffer: &[u8]) -> String {
    let hex = hex::encode_upper(buffer);
    match str::from_utf8(hex.as_slice()) {
        Ok(s) => s.to_string(),
        Err(_e) => "".to_string(),
    }
}

/// `canonical_serial_bytes` strips leading zero octets from the content octets of a DER INTEGER
/// so that serial numbers compare numerically, i.e., `00 8F 01` and `8F 01` are the same serial.
/// A serial of zero is represented by a single zero octet.
pub fn canonical_serial_bytes(serial: &[u8]) -> Vec<u8> {
    match serial.iter().position(|b| *b != 0) {
        Some(first) => serial[first..].to_vec(),
        None => vec![0],
    }
}

fn find(haystack: &[u8], needle: &[u8]) -> Option<usize> {
    haystack.windows(needle.len()).position(|w| w == needle)
}

/// Returns the first `-----BEGIN`/`-----END` block of a PEM buffer. Input with no complete block
/// is returned unchanged so the decoder reports the error.
fn first_pem_block(pem: &[u8]) -> &[u8] {
    const END: &[u8] = b"-----END ";
    const DASHES: &[u8] = b"-----";
    if let Some(end) = find(pem, END) {
        let label_start = end + END.len();
        if let Some(close) = find(&pem[label_start..], DASHES) {
            return &pem[..label_start + close + DASHES.len()];
        }
    }
    pem
}

/// `decode_pem_or_der` returns the DER encoding of the presented buffer. Buffers that look like
/// PEM, i.e., begin with a `-----BEGIN` line after any leading whitespace, are decoded. When the
/// buffer holds several PEM blocks, as in a certificate bundle, only the first is decoded. All
/// other buffers are assumed to already be DER encoded and are returned as is.
pub fn decode_pem_or_der(buffer: &[u8]) -> Result<Vec<u8>> {
    let start = buffer
        .iter()
        .position(|b| !b.is_ascii_whitespace())
        .unwrap_or(buffer.len());
    let trimmed = &buffer[start..];
    if trimmed.first() == Some(&0x2D) {
        match pem_rfc7468::decode_vec(first_pem_block(trimmed)) {
            Ok((label, der)) => {
                debug!("Decoded PEM buffer with {} label", label);
                Ok(der)
            }
            Err(e) => {
                error!("Failed to decode PEM buffer: {}", e);
                Err(Error::ParseError)
            }
        }
    } else {
        Ok(buffer.to_vec())
    }
}

/// `is_http_uri` returns true if the presented string is a well-formed http or https URL with a host.
pub fn is_http_uri(uri: &str) -> bool {
    match Url::parse(uri) {
        Ok(url) => (url.scheme() == "http" || url.scheme() == "https") && url.host().is_some(),
        Err(_e) => false,
    }
}

/// `get_file_as_byte_vec` takes a Path containing a file name and returns a vector of bytes containing
/// the contents of that file or an [Error::StdIoError].
pub fn get_file_as_byte_vec(filename: &Path) -> Result<Vec<u8>> {
    let mut f = File::open(filename)?;
    let mut buffer = vec![];
    f.read_to_end(&mut buffer)?;
    Ok(buffer)
}
