//! Payment provider redirect handling.
//!
//! After checkout the provider sends the user back to the application with
//! the outcome in the query string. VNPay uses its own `vnp_*` parameters;
//! the backend's own return page uses `payment_success` / `payment_error`.

use std::borrow::Cow;

use ev_market_core::PaymentId;
use rust_decimal::Decimal;
use url::Url;

/// VNPay code for an approved transaction.
const VNPAY_SUCCESS_CODE: &str = "00";

const APP_PARAMS: &[&str] = &["payment_success", "payment_error", "payment_id", "amount"];

/// Details carried by a redirect, whatever its outcome.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PaymentDetails {
    /// Payment reference (`vnp_TxnRef` or `payment_id`).
    pub reference: Option<String>,
    /// Amount in VND. VNPay sends amount x 100; this is already divided.
    pub amount: Option<Decimal>,
    pub transaction_no: Option<String>,
    pub bank_code: Option<String>,
    pub order_info: Option<String>,
}

impl PaymentDetails {
    /// The reference as a backend payment id, when numeric.
    #[must_use]
    pub fn payment_id(&self) -> Option<PaymentId> {
        self.reference.as_deref()?.parse().ok()
    }
}

/// Outcome read from a return URL.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PaymentReturn {
    Success(PaymentDetails),
    Failure {
        details: PaymentDetails,
        /// Provider response code, when the provider sent one.
        code: Option<String>,
        /// Message to show the user.
        reason: String,
    },
}

impl PaymentReturn {
    #[must_use]
    pub const fn is_success(&self) -> bool {
        matches!(self, Self::Success(_))
    }

    #[must_use]
    pub const fn details(&self) -> &PaymentDetails {
        match self {
            Self::Success(details) | Self::Failure { details, .. } => details,
        }
    }
}

fn is_payment_param(name: &str) -> bool {
    name.starts_with("vnp_") || APP_PARAMS.contains(&name)
}

fn param(url: &Url, name: &str) -> Option<String> {
    url.query_pairs()
        .find(|(k, _)| k == name)
        .map(|(_, v)| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

fn vnpay_failure_reason(code: &str) -> Cow<'static, str> {
    match code {
        "07" => "Giao dịch bị nghi ngờ gian lận.".into(),
        "09" => "Thẻ hoặc tài khoản chưa đăng ký Internet Banking.".into(),
        "11" => "Đã hết hạn chờ thanh toán.".into(),
        "12" => "Thẻ hoặc tài khoản bị khóa.".into(),
        "24" => "Bạn đã hủy giao dịch.".into(),
        "51" => "Tài khoản không đủ số dư.".into(),
        "65" => "Tài khoản đã vượt quá hạn mức giao dịch trong ngày.".into(),
        "75" => "Ngân hàng thanh toán đang bảo trì.".into(),
        _ => format!("Thanh toán không thành công (mã {code}).").into(),
    }
}

/// Read the payment outcome from a return URL.
///
/// Returns `None` when the URL carries no payment parameters.
#[must_use]
pub fn parse_payment_return(url: &Url) -> Option<PaymentReturn> {
    if let Some(code) = param(url, "vnp_ResponseCode") {
        let details = PaymentDetails {
            reference: param(url, "vnp_TxnRef"),
            amount: param(url, "vnp_Amount")
                .and_then(|a| a.parse::<Decimal>().ok())
                .map(|a| a / Decimal::ONE_HUNDRED),
            transaction_no: param(url, "vnp_TransactionNo"),
            bank_code: param(url, "vnp_BankCode"),
            order_info: param(url, "vnp_OrderInfo"),
        };
        if code == VNPAY_SUCCESS_CODE {
            return Some(PaymentReturn::Success(details));
        }
        let reason = vnpay_failure_reason(&code).into_owned();
        return Some(PaymentReturn::Failure {
            details,
            code: Some(code),
            reason,
        });
    }

    let success = param(url, "payment_success");
    let error = param(url, "payment_error");
    if success.is_none() && error.is_none() {
        return None;
    }

    let details = PaymentDetails {
        reference: param(url, "payment_id"),
        amount: param(url, "amount").and_then(|a| a.parse().ok()),
        ..PaymentDetails::default()
    };

    let succeeded = error.is_none()
        && success
            .as_deref()
            .is_some_and(|s| s.eq_ignore_ascii_case("true") || s == "1");
    if succeeded {
        Some(PaymentReturn::Success(details))
    } else {
        Some(PaymentReturn::Failure {
            details,
            code: None,
            reason: error.unwrap_or_else(|| "Thanh toán không thành công.".to_string()),
        })
    }
}

/// The URL without payment parameters, so a reload does not re-process
/// the outcome.
#[must_use]
pub fn strip_payment_params(url: &Url) -> Url {
    let kept: Vec<(String, String)> = url
        .query_pairs()
        .filter(|(k, _)| !is_payment_param(k))
        .map(|(k, v)| (k.into_owned(), v.into_owned()))
        .collect();

    let mut stripped = url.clone();
    if kept.is_empty() {
        stripped.set_query(None);
    } else {
        stripped.query_pairs_mut().clear().extend_pairs(kept);
    }
    stripped
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn url(s: &str) -> Url {
        Url::parse(s).unwrap()
    }

    #[test]
    fn test_vnpay_success() {
        let u = url(
            "https://shop.test/payment/return?vnp_ResponseCode=00&vnp_TxnRef=123\
             &vnp_Amount=5000000&vnp_TransactionNo=14012345&vnp_BankCode=NCB\
             &vnp_OrderInfo=Dat%20coc%20don%2045",
        );
        let result = parse_payment_return(&u).unwrap();
        assert!(result.is_success());

        let details = result.details();
        assert_eq!(details.payment_id(), Some(PaymentId::new(123)));
        assert_eq!(details.amount, Some(Decimal::from(50_000)));
        assert_eq!(details.bank_code.as_deref(), Some("NCB"));
        assert_eq!(details.order_info.as_deref(), Some("Dat coc don 45"));
    }

    #[test]
    fn test_vnpay_cancelled() {
        let u = url("https://shop.test/?vnp_ResponseCode=24&vnp_TxnRef=9");
        match parse_payment_return(&u).unwrap() {
            PaymentReturn::Failure { code, reason, details } => {
                assert_eq!(code.as_deref(), Some("24"));
                assert_eq!(reason, "Bạn đã hủy giao dịch.");
                assert_eq!(details.reference.as_deref(), Some("9"));
            }
            PaymentReturn::Success(_) => panic!("expected failure"),
        }
    }

    #[test]
    fn test_app_params() {
        let ok = url("https://shop.test/?payment_success=true&payment_id=7&amount=250000");
        let result = parse_payment_return(&ok).unwrap();
        assert!(result.is_success());
        assert_eq!(result.details().amount, Some(Decimal::from(250_000)));

        let failed = url("https://shop.test/?payment_error=Het%20han");
        match parse_payment_return(&failed).unwrap() {
            PaymentReturn::Failure { reason, code, .. } => {
                assert_eq!(reason, "Het han");
                assert!(code.is_none());
            }
            PaymentReturn::Success(_) => panic!("expected failure"),
        }
    }

    #[test]
    fn test_no_payment_params() {
        assert!(parse_payment_return(&url("https://shop.test/products?page=2")).is_none());
        assert!(parse_payment_return(&url("https://shop.test/?payment_id=3")).is_none());
    }

    #[test]
    fn test_strip_payment_params() {
        let u = url("https://shop.test/orders?tab=mine&vnp_ResponseCode=00&vnp_TxnRef=1&payment_id=1");
        assert_eq!(
            strip_payment_params(&u).as_str(),
            "https://shop.test/orders?tab=mine"
        );

        let only = url("https://shop.test/orders?payment_success=true");
        assert_eq!(strip_payment_params(&only).as_str(), "https://shop.test/orders");
    }
}
