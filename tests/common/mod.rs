#![allow(dead_code)]

use swish::{ClientConfig, CredentialSource, PaymentRecord, SwishClient};

pub const PASSPHRASE: &str = "swish";
pub const PAYMENT_ID: &str = "AB23D7406ECE4542A80152D909EF9F6B";

/// A merchant PKCS#12 archive and a root bundle, generated per test
pub struct TestCredentials {
    pub p12: Vec<u8>,
    pub root_pem: Vec<u8>,
}

pub fn test_credentials() -> TestCredentials {
    let merchant = rcgen::generate_simple_self_signed(vec!["merchant.example".to_string()])
        .expect("merchant certificate");
    let root = rcgen::generate_simple_self_signed(vec!["mss.swicpc.bankgirot.se".to_string()])
        .expect("root certificate");

    let pfx = p12::PFX::new(
        merchant.cert.der(),
        &merchant.key_pair.serialize_der(),
        None,
        PASSPHRASE,
        "merchant",
    )
    .expect("pkcs12 archive");

    TestCredentials {
        p12: pfx.to_der(),
        root_pem: root.cert.pem().into_bytes(),
    }
}

pub fn test_config() -> ClientConfig {
    let creds = test_credentials();
    ClientConfig::new(
        "test",
        CredentialSource::bytes(creds.p12),
        PASSPHRASE,
        CredentialSource::bytes(creds.root_pem),
    )
}

/// A client pointed at a mock server
pub fn test_client(base_url: &str) -> SwishClient {
    SwishClient::new(test_config().with_base_url(base_url)).expect("swish client")
}

pub fn test_payment_request() -> PaymentRecord {
    PaymentRecord::payment(
        100u32,
        "SEK",
        "1234760039",
        "https://example.com/api/swishcb/paymentrequests",
    )
    .with_payee_payment_reference("0123456789")
    .with_payer_alias("46701234567")
    .with_message("Kingston USB Flash Drive 8 GB")
}

pub fn test_refund_request() -> PaymentRecord {
    PaymentRecord::refund(
        PAYMENT_ID,
        100u32,
        "SEK",
        "46701234567",
        "https://example.com/api/swishcb/paymentrequests",
    )
    .with_payer_payment_reference("0123456789")
    .with_message("Refund for Kingston USB Flash Drive 8 GB")
}
