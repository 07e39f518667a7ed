//! Payment request and refund endpoints

use crate::client::SwishClient;
use crate::types::{PaymentRecord, PAYMENT_REQUESTS_PATH, REFUNDS_PATH};
use crate::Result;
use percent_encoding::{utf8_percent_encode, AsciiSet, NON_ALPHANUMERIC};
use tokio_util::sync::CancellationToken;

/// Characters escaped when an identifier is placed in a path segment
const PATH_SEGMENT: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'_')
    .remove(b'.')
    .remove(b'~');

impl SwishClient {
    /// Create a payment request.
    ///
    /// Returns the record that was sent with its `id` set to the identifier
    /// Swish assigned. Any `id` already on the record is not sent.
    pub async fn create_payment(
        &self,
        cancel: &CancellationToken,
        record: PaymentRecord,
    ) -> Result<PaymentRecord> {
        self.create(cancel, PAYMENT_REQUESTS_PATH, record).await
    }

    /// Get a payment request by id
    pub async fn get_payment(&self, cancel: &CancellationToken, id: &str) -> Result<PaymentRecord> {
        self.dispatch_get(cancel, &resource_path(PAYMENT_REQUESTS_PATH, id))
            .await
    }

    /// Create a refund of a previous payment.
    ///
    /// Returns the record that was sent with its `id` set to the identifier
    /// Swish assigned.
    pub async fn create_refund(
        &self,
        cancel: &CancellationToken,
        record: PaymentRecord,
    ) -> Result<PaymentRecord> {
        self.create(cancel, REFUNDS_PATH, record).await
    }

    /// Get a refund by id
    pub async fn get_refund(&self, cancel: &CancellationToken, id: &str) -> Result<PaymentRecord> {
        self.dispatch_get(cancel, &resource_path(REFUNDS_PATH, id))
            .await
    }

    async fn create(
        &self,
        cancel: &CancellationToken,
        collection: &str,
        record: PaymentRecord,
    ) -> Result<PaymentRecord> {
        let record = PaymentRecord { id: None, ..record };
        let id = self.dispatch_create(cancel, collection, &record).await?;

        tracing::debug!("Swish created {}/{}", collection, id);

        Ok(PaymentRecord {
            id: Some(id),
            ..record
        })
    }
}

fn resource_path(collection: &str, id: &str) -> String {
    format!("{}/{}", collection, utf8_percent_encode(id, PATH_SEGMENT))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resource_path() {
        assert_eq!(
            resource_path(PAYMENT_REQUESTS_PATH, "AB23D7406ECE4542A80152D909EF9F6B"),
            "/paymentrequests/AB23D7406ECE4542A80152D909EF9F6B"
        );
        assert_eq!(resource_path(REFUNDS_PATH, "a/b c"), "/refunds/a%2Fb%20c");
    }
}
