//! Audited secret service.
//!
//! Wraps a [`SecretHandler`] with identity checks, strict body decoding and
//! audit logging. Each operation records an `Enter` entry when the call
//! arrives and exactly one terminal entry describing the outcome.
//!
//! # Security
//!
//! Terminal entries carry the response that was returned. Secret values in
//! that response are never written: the journal only sees the response's
//! audit-safe summary.
//!
//! # Example
//!
//! ```rust,ignore
//! use aegis_core::secrets::{AuditedSecretService, CallContext, MemorySecretHandler};
//!
//! let service = AuditedSecretService::new(MemorySecretHandler::new(), &config, Journal::default());
//! let ctx = CallContext::new(correlation_id, "POST", "/workload/v1/secrets", svid);
//! let response = service.fetch(&ctx, body).await;
//! ```

use tracing::{debug, Instrument};

use super::handler::SecretHandler;
use crate::audit::{new_correlation_id, AuditEvent, Journal, JournalEntry};
use crate::audit_span;
use crate::config::Config;
use crate::domain::SecretMeta;
use crate::identity::{IdentityClassifier, TrustRole};
use crate::reqres::{
    decode, Entity, SecretFetchRequest, SecretFetchResponse, SecretListRequest,
    SecretListResponse, SecretUpsertRequest, SecretUpsertResponse,
};

pub const ERR_BAD_SVID: &str = "caller identity is not allowed to perform this operation";
pub const ERR_NO_WORKLOAD_ID: &str = "no workload id";

/// Request metadata shared by every audit entry of one call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CallContext {
    /// Caller supplied; logged verbatim
    pub correlation_id: String,
    pub method: String,
    pub url: String,
    /// The caller's verified SVID
    pub svid: String,
}

impl CallContext {
    pub fn new(
        correlation_id: impl Into<String>,
        method: impl Into<String>,
        url: impl Into<String>,
        svid: impl Into<String>,
    ) -> Self {
        Self {
            correlation_id: correlation_id.into(),
            method: method.into(),
            url: url.into(),
            svid: svid.into(),
        }
    }

    /// A context with a freshly generated correlation id.
    pub fn generated(
        method: impl Into<String>,
        url: impl Into<String>,
        svid: impl Into<String>,
    ) -> Self {
        Self::new(new_correlation_id(), method, url, svid)
    }

    fn entry(&self, event: AuditEvent) -> JournalEntry {
        JournalEntry::new(&self.correlation_id, &self.method, &self.url, &self.svid, event)
    }
}

/// Secret operations with identity checks and audit logging.
pub struct AuditedSecretService<H: SecretHandler> {
    handler: H,
    classifier: IdentityClassifier,
    journal: Journal,
    defaults: SecretMeta,
}

impl<H: SecretHandler> AuditedSecretService<H> {
    /// Creates a service from the resolved configuration.
    pub fn new(handler: H, config: &Config, journal: Journal) -> Self {
        Self::with_parts(handler, config.classifier(), journal, config.safe.default_secret_meta())
    }

    pub fn with_parts(
        handler: H,
        classifier: IdentityClassifier,
        journal: Journal,
        defaults: SecretMeta,
    ) -> Self {
        Self { handler, classifier, journal, defaults }
    }

    pub fn handler(&self) -> &H {
        &self.handler
    }

    pub fn classifier(&self) -> &IdentityClassifier {
        &self.classifier
    }

    /// Serve a workload's own secret. The workload is named by its SVID.
    pub async fn fetch(&self, ctx: &CallContext, body: &[u8]) -> SecretFetchResponse {
        async {
            self.enter(ctx);

            if !self.classifier.is_workload(&ctx.svid) {
                let response = SecretFetchResponse::failure(ERR_BAD_SVID);
                return self.finish(ctx, AuditEvent::BadSvid, response);
            }

            if let Err(e) = decode::<SecretFetchRequest>(body) {
                let response = SecretFetchResponse::failure(e.to_string());
                return self.finish(ctx, e.audit_event(), response);
            }

            let Some(workload_id) = self.classifier.workload_id(&ctx.svid) else {
                return self.finish(
                    ctx,
                    AuditEvent::NoWorkloadId,
                    SecretFetchResponse::failure(ERR_NO_WORKLOAD_ID),
                );
            };

            match self.handler.fetch(workload_id).await {
                Ok(stored) => {
                    debug!(workload_id = %workload_id, "Secret fetched");
                    self.finish(ctx, AuditEvent::Success, SecretFetchResponse::from(&stored))
                }
                Err(e) => {
                    self.finish(ctx, e.audit_event(), SecretFetchResponse::failure(e.to_string()))
                }
            }
        }
        .instrument(audit_span!("fetch", ctx.correlation_id))
        .await
    }

    /// Create or replace a workload's secret on behalf of the orchestrator.
    pub async fn upsert(&self, ctx: &CallContext, body: &[u8]) -> SecretUpsertResponse {
        async {
            self.enter(ctx);

            if !self.classifier.is_orchestrator(&ctx.svid) {
                let response = SecretUpsertResponse::failure(ERR_BAD_SVID);
                return self.finish(ctx, AuditEvent::BadSvid, response);
            }

            let request = match decode::<SecretUpsertRequest>(body) {
                Ok(request) => request,
                Err(e) => {
                    return self.finish(
                        ctx,
                        e.audit_event(),
                        SecretUpsertResponse::failure(e.to_string()),
                    )
                }
            };

            if request.workload_id.is_empty() {
                return self.finish(
                    ctx,
                    AuditEvent::NoWorkloadId,
                    SecretUpsertResponse::failure(ERR_NO_WORKLOAD_ID),
                );
            }

            let meta = request.meta(&self.defaults);
            match self.handler.upsert(&request.workload_id, request.value, meta).await {
                Ok(()) => {
                    debug!(workload_id = %request.workload_id, "Secret upserted");
                    self.finish(ctx, AuditEvent::Success, SecretUpsertResponse::default())
                }
                Err(e) => {
                    self.finish(ctx, e.audit_event(), SecretUpsertResponse::failure(e.to_string()))
                }
            }
        }
        .instrument(audit_span!("upsert", ctx.correlation_id))
        .await
    }

    /// List secret summaries on behalf of the orchestrator.
    pub async fn list(&self, ctx: &CallContext, body: &[u8]) -> SecretListResponse {
        async {
            self.enter(ctx);

            if !self.classifier.is_orchestrator(&ctx.svid) {
                let response = SecretListResponse::failure(ERR_BAD_SVID);
                return self.finish(ctx, AuditEvent::BadSvid, response);
            }

            if let Err(e) = decode::<SecretListRequest>(body) {
                let response = SecretListResponse::failure(e.to_string());
                return self.finish(ctx, e.audit_event(), response);
            }

            match self.handler.list().await {
                Ok(secrets) => {
                    debug!(count = secrets.len(), "Secrets listed");
                    self.finish(ctx, AuditEvent::Success, SecretListResponse::new(secrets))
                }
                Err(e) => {
                    self.finish(ctx, e.audit_event(), SecretListResponse::failure(e.to_string()))
                }
            }
        }
        .instrument(audit_span!("list", ctx.correlation_id))
        .await
    }

    /// Check the SVID presented by an outbound peer (e.g. the safe, when the
    /// sentinel calls it). A mismatch is audited as `aegis-bad-peer-svid`.
    pub fn verify_peer(&self, ctx: &CallContext, peer_svid: &str, role: TrustRole) -> bool {
        if self.classifier.has_role(peer_svid, role) {
            return true;
        }

        let entry = JournalEntry::new(
            &ctx.correlation_id,
            &ctx.method,
            &ctx.url,
            peer_svid,
            AuditEvent::BadPeerSvid,
        );
        self.journal.record(&entry);
        false
    }

    fn enter(&self, ctx: &CallContext) {
        self.journal.record(&ctx.entry(AuditEvent::Enter));
    }

    fn finish<R>(&self, ctx: &CallContext, event: AuditEvent, response: R) -> R
    where
        R: Clone + Into<Entity>,
    {
        self.journal.record(&ctx.entry(event).with_entity(response.clone()));
        response
    }
}
