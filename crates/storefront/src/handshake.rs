//! Pre-checkout validation handshake.
//!
//! Before an order can be placed the client proves some human interaction
//! happened: it bundles interaction counters and viewport geometry into a
//! [`ValidationMessage`], encrypts it, and trades it with the store for a
//! single-use token. The token is encrypted again and handed to checkout as
//! an [`EncryptedToken`].
//!
//! ```text
//! Idle -> Collecting -> Encrypting -> AwaitingToken -> TokenGranted | TokenDenied
//!   ^                                                         |
//!   +---------------- guard dropped (success, failure, cancel) +
//! ```
//!
//! At most one attempt runs at a time. [`ValidationHandshake::try_begin`]
//! hands out a [`HandshakeGuard`]; while it lives every other trigger is
//! rejected, and dropping it returns the handshake to `Idle`.

use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::{Arc, Mutex, PoisonError};

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::api::{StoreApi, TokenVerdict};
use crate::crypto::{CipherError, ObfuscationCipher};
use crate::error::CheckoutError;

/// Where the current attempt is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum HandshakePhase {
    #[default]
    Idle,
    Collecting,
    Encrypting,
    AwaitingToken,
    TokenGranted,
    TokenDenied,
}

impl HandshakePhase {
    /// Whether an attempt currently holds the handshake.
    #[must_use]
    pub const fn is_in_flight(self) -> bool {
        !matches!(self, Self::Idle)
    }
}

// =============================================================================
// Signals
// =============================================================================

/// Key-up and tap counters for the checkout screen.
///
/// Clones share the same counters.
#[derive(Debug, Clone, Default)]
pub struct InteractionCounters {
    key_ups: Arc<AtomicU32>,
    taps: Arc<AtomicU32>,
}

impl InteractionCounters {
    pub fn record_key_up(&self) {
        self.key_ups.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_tap(&self) {
        self.taps.fetch_add(1, Ordering::Relaxed);
    }

    #[must_use]
    pub fn key_ups(&self) -> u32 {
        self.key_ups.load(Ordering::Relaxed)
    }

    #[must_use]
    pub fn taps(&self) -> u32 {
        self.taps.load(Ordering::Relaxed)
    }

    /// Zero both counters (on entering the checkout screen).
    pub fn reset(&self) {
        self.key_ups.store(0, Ordering::Relaxed);
        self.taps.store(0, Ordering::Relaxed);
    }
}

/// Screen geometry at the moment the submit control was activated.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ViewportSignals {
    pub screen_width: u32,
    pub screen_height: u32,
    pub inner_width: u32,
    pub inner_height: u32,
    /// Top edge of the submit control, in pixels.
    pub trigger_top: f64,
    /// Left edge of the submit control, in pixels.
    pub trigger_left: f64,
}

impl ViewportSignals {
    /// `trigger_top + trigger_left`, truncated toward zero.
    #[must_use]
    #[allow(clippy::cast_possible_truncation)] // truncation is the checksum
    pub fn position_checksum(&self) -> i64 {
        let sum = self.trigger_top + self.trigger_left;
        if sum.is_finite() { sum.trunc() as i64 } else { 0 }
    }
}

/// The fingerprint sent to the validation authority.
///
/// Field order is part of the wire contract.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ValidationMessage {
    pub keys_on_up: u32,
    pub taps_count: u32,
    pub screen_width: u32,
    pub screen_height: u32,
    pub inner_screen_width: u32,
    pub inner_screen_height: u32,
    pub btn_clicks: i64,
    /// Seconds since the Unix epoch.
    pub time_stamp: i64,
}

impl ValidationMessage {
    /// Build a fingerprint from the current counters and viewport.
    #[must_use]
    pub fn collect(
        counters: &InteractionCounters,
        viewport: &ViewportSignals,
        now: DateTime<Utc>,
    ) -> Self {
        Self {
            keys_on_up: counters.key_ups(),
            taps_count: counters.taps(),
            screen_width: viewport.screen_width,
            screen_height: viewport.screen_height,
            inner_screen_width: viewport.inner_width,
            inner_screen_height: viewport.inner_height,
            btn_clicks: viewport.position_checksum(),
            time_stamp: now.timestamp(),
        }
    }
}

/// A token ready to be sent to checkout.
///
/// Not `Clone`: building a [`CheckoutRequest`](crate::api::CheckoutRequest)
/// consumes it, so one token backs at most one checkout.
pub struct EncryptedToken(String);

impl EncryptedToken {
    pub(crate) fn into_inner(self) -> String {
        self.0
    }
}

impl std::fmt::Debug for EncryptedToken {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("EncryptedToken([REDACTED])")
    }
}

// =============================================================================
// Handshake
// =============================================================================

/// Exclusive claim on the handshake for one attempt.
///
/// Dropping the guard returns the handshake to `Idle`, including when the
/// owning future is cancelled mid-request.
#[derive(Debug)]
pub struct HandshakeGuard {
    phase: Arc<Mutex<HandshakePhase>>,
}

impl HandshakeGuard {
    fn set(&self, phase: HandshakePhase) {
        *self.phase.lock().unwrap_or_else(PoisonError::into_inner) = phase;
        tracing::debug!(?phase, "Handshake phase");
    }
}

impl Drop for HandshakeGuard {
    fn drop(&mut self) {
        *self.phase.lock().unwrap_or_else(PoisonError::into_inner) = HandshakePhase::Idle;
    }
}

/// Coordinates fingerprint collection and token exchange.
#[derive(Debug, Default)]
pub struct ValidationHandshake {
    cipher: ObfuscationCipher,
    counters: InteractionCounters,
    phase: Arc<Mutex<HandshakePhase>>,
}

impl ValidationHandshake {
    /// Create a handshake using `cipher`.
    #[must_use]
    pub fn new(cipher: ObfuscationCipher) -> Self {
        Self {
            cipher,
            counters: InteractionCounters::default(),
            phase: Arc::new(Mutex::new(HandshakePhase::Idle)),
        }
    }

    /// Current phase. Callers disable the submit control while in flight.
    #[must_use]
    pub fn phase(&self) -> HandshakePhase {
        *self.phase.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Interaction counters feeding the fingerprint.
    #[must_use]
    pub const fn counters(&self) -> &InteractionCounters {
        &self.counters
    }

    /// Claim the handshake for a new attempt.
    ///
    /// # Errors
    ///
    /// Returns [`CheckoutError::InFlight`] if another attempt holds it.
    pub fn try_begin(&self) -> Result<HandshakeGuard, CheckoutError> {
        let mut phase = self.phase.lock().unwrap_or_else(PoisonError::into_inner);
        if phase.is_in_flight() {
            tracing::debug!(phase = ?*phase, "Rejected concurrent checkout trigger");
            return Err(CheckoutError::InFlight);
        }
        *phase = HandshakePhase::Collecting;
        drop(phase);

        Ok(HandshakeGuard {
            phase: Arc::clone(&self.phase),
        })
    }

    /// Run one handshake: collect, encrypt, exchange, and wrap the token.
    ///
    /// A fresh fingerprint and timestamp are produced on every call.
    ///
    /// # Errors
    ///
    /// - [`CheckoutError::Encryption`] if either encryption step fails
    /// - [`CheckoutError::HandshakeDenied`] if the store declines
    /// - [`CheckoutError::Network`] on transport failure or a non-2xx status
    pub async fn obtain_token<A: StoreApi>(
        &self,
        guard: &HandshakeGuard,
        api: &A,
        viewport: &ViewportSignals,
    ) -> Result<EncryptedToken, CheckoutError> {
        guard.set(HandshakePhase::Collecting);
        let message = ValidationMessage::collect(&self.counters, viewport, Utc::now());

        guard.set(HandshakePhase::Encrypting);
        let plaintext = serde_json::to_string(&message).map_err(CipherError::from)?;
        let check = self.cipher.encrypt_hex(&plaintext)?;

        guard.set(HandshakePhase::AwaitingToken);
        let verdict = api.validate(&check).await;

        match verdict {
            Ok(TokenVerdict::Granted(token)) => {
                guard.set(HandshakePhase::TokenGranted);
                Ok(EncryptedToken(self.cipher.encrypt_hex(token.expose())?))
            }
            Ok(TokenVerdict::Denied { message }) => {
                guard.set(HandshakePhase::TokenDenied);
                Err(CheckoutError::HandshakeDenied { message })
            }
            Err(e) => {
                guard.set(HandshakePhase::TokenDenied);
                Err(CheckoutError::Network(e))
            }
        }
    }
}
