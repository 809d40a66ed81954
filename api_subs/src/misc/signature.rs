use common::error::{AppError, Res};
use hmac::{Hmac, Mac};
use sha2::Sha256;

type HmacSha256 = Hmac<Sha256>;

/// Maximum age of a signed payload, in seconds.
pub const TOLERANCE_SECS: i64 = 300;

/// Verifies a `stripe-signature` header (`t=<unix>,v1=<hex>[,v1=<hex>...]`) against `payload`.
///
/// The signed content is `"{t}.{payload}"`, keyed with the full webhook secret.
pub fn verify_signature(payload: &str, header: &str, secret: &str, now: i64) -> Res<()> {
    if secret.is_empty() {
        return Err(webhook_error("webhook signing secret is not configured"));
    }

    let mut timestamp: Option<i64> = None;
    let mut signatures: Vec<Vec<u8>> = Vec::new();

    for part in header.split(',') {
        match part.trim().split_once('=') {
            Some(("t", value)) => timestamp = value.parse().ok(),
            Some(("v1", value)) => {
                if let Ok(bytes) = hex::decode(value) {
                    signatures.push(bytes);
                }
            }
            _ => {}
        }
    }

    let timestamp =
        timestamp.ok_or_else(|| webhook_error("missing timestamp in signature header"))?;
    if signatures.is_empty() {
        return Err(webhook_error("missing v1 signature in signature header"));
    }
    // abs_diff cannot overflow on attacker-chosen timestamps
    if now.abs_diff(timestamp) > TOLERANCE_SECS as u64 {
        return Err(webhook_error("timestamp outside the tolerance zone"));
    }

    let mac = signed_mac(payload, secret, timestamp)?;
    if signatures
        .iter()
        .any(|signature| mac.clone().verify_slice(signature).is_ok())
    {
        Ok(())
    } else {
        Err(webhook_error("no signatures found matching the expected signature"))
    }
}

/// Builds the header Stripe would send for `payload` signed at `timestamp`.
pub fn signature_header(payload: &str, secret: &str, timestamp: i64) -> Res<String> {
    let mac = signed_mac(payload, secret, timestamp)?;
    Ok(format!(
        "t={},v1={}",
        timestamp,
        hex::encode(mac.finalize().into_bytes())
    ))
}

fn signed_mac(payload: &str, secret: &str, timestamp: i64) -> Res<HmacSha256> {
    let mut mac = HmacSha256::new_from_slice(secret.as_bytes())
        .map_err(|e| AppError::Internal(format!("Invalid webhook secret: {}", e)))?;
    mac.update(timestamp.to_string().as_bytes());
    mac.update(b".");
    mac.update(payload.as_bytes());
    Ok(mac)
}

fn webhook_error(reason: &str) -> AppError {
    log::error!("Error verifying webhook signature: {}", reason);
    AppError::BadRequest(format!("Webhook Error: {}", reason))
}

#[cfg(test)]
mod tests {
    use super::*;

    const SECRET: &str = "whsec_test_secret";
    const PAYLOAD: &str = r#"{"id":"evt_1","type":"invoice.paid"}"#;
    const NOW: i64 = 1_700_000_000;

    #[test]
    fn accepts_own_signature() {
        let header = signature_header(PAYLOAD, SECRET, NOW).unwrap();
        assert!(verify_signature(PAYLOAD, &header, SECRET, NOW + 10).is_ok());
    }

    #[test]
    fn accepts_any_matching_v1_entry() {
        let valid = signature_header(PAYLOAD, SECRET, NOW).unwrap();
        let v1 = valid.split_once(",v1=").unwrap().1;
        let header = format!("t={},v1={},v1={},v0=ignored", NOW, "00".repeat(32), v1);
        assert!(verify_signature(PAYLOAD, &header, SECRET, NOW).is_ok());
    }

    #[test]
    fn rejects_tampered_payload() {
        let header = signature_header(PAYLOAD, SECRET, NOW).unwrap();
        let tampered = PAYLOAD.replace("invoice.paid", "invoice.void");
        assert!(matches!(
            verify_signature(&tampered, &header, SECRET, NOW),
            Err(AppError::BadRequest(_))
        ));
    }

    #[test]
    fn rejects_wrong_secret() {
        let header = signature_header(PAYLOAD, "whsec_other", NOW).unwrap();
        assert!(verify_signature(PAYLOAD, &header, SECRET, NOW).is_err());
    }

    #[test]
    fn rejects_stale_timestamp() {
        let header = signature_header(PAYLOAD, SECRET, NOW).unwrap();
        assert!(verify_signature(PAYLOAD, &header, SECRET, NOW + TOLERANCE_SECS + 1).is_err());
    }

    #[test]
    fn rejects_malformed_headers() {
        for header in ["", "garbage", "t=abc,v1=00", &format!("t={}", NOW), "v1=deadbeef"] {
            assert!(verify_signature(PAYLOAD, header, SECRET, NOW).is_err(), "{header}");
        }
    }

    #[test]
    fn rejects_extreme_timestamps() {
        let signature = "00".repeat(32);
        for timestamp in [i64::MIN, i64::MAX] {
            let header = format!("t={},v1={}", timestamp, signature);
            assert!(matches!(
                verify_signature(PAYLOAD, &header, SECRET, NOW),
                Err(AppError::BadRequest(_))
            ));
        }
    }

    #[test]
    fn rejects_everything_without_secret() {
        let header = signature_header(PAYLOAD, SECRET, NOW).unwrap();
        assert!(verify_signature(PAYLOAD, &header, "", NOW).is_err());
    }
}
