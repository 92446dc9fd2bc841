use crate::error::Error;
use crate::lookup::Node;
use crate::model::{Document, SchemaLocation};
use crate::pointer::JsonPointer;
use crate::resolver::walk::{walk_document, RefSlot, Visitor};
use crate::resolver::{Resolution, ResolveOptions, Resolver, SchemaRegistry};
use serde::Serialize;
use serde_json::Value;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::Semaphore;
use tracing::{debug, info, warn};
use url::Url;

/// A `$ref` left unresolved after initialization.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UnresolvedReference {
    /// Where the `$ref` sits, as a JSON Pointer into the document.
    pub location: String,
    pub target: String,
    pub reason: String,
}

/// Summary of one [`Document::initialize`] run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct InitializeReport {
    /// References resolved by this run.
    pub resolved: usize,
    /// Resolution passes performed.
    pub passes: usize,
    pub unresolved: Vec<UnresolvedReference>,
}

impl InitializeReport {
    #[must_use]
    pub fn is_complete(&self) -> bool {
        self.unresolved.is_empty()
    }
}

/// One unresolved slot, numbered by walk order.
struct Pending {
    ordinal: usize,
    location: String,
    target: String,
    follows_chains: bool,
}

#[derive(Default)]
struct PendingCollector {
    next: usize,
    pending: Vec<Pending>,
}

impl Visitor for PendingCollector {
    fn reference(&mut self, at: &JsonPointer, slot: &mut dyn RefSlot) {
        let ordinal = self.next;
        self.next += 1;
        if !slot.is_resolved() {
            self.pending.push(Pending {
                ordinal,
                location: at.to_string(),
                target: slot.target().to_string(),
                follows_chains: slot.follows_chains(),
            });
        }
    }
}

struct Applier {
    next: usize,
    found: HashMap<usize, (Node, Option<SchemaLocation>)>,
    rejected: HashMap<usize, String>,
    identified: Vec<(Url, Value)>,
    applied: usize,
}

impl Visitor for Applier {
    fn reference(&mut self, _at: &JsonPointer, slot: &mut dyn RefSlot) {
        let ordinal = self.next;
        self.next += 1;
        if let Some((node, origin)) = self.found.remove(&ordinal) {
            if slot.accept(&node, origin.as_ref(), &mut self.identified) {
                self.applied += 1;
            } else {
                self.rejected.insert(
                    ordinal,
                    format!("target is a {} that does not fit here", node.kind()),
                );
            }
        }
    }
}

impl Document {
    /// Registers this document's schemas, then resolves its `$ref`s.
    ///
    /// Resolution runs in passes over a snapshot of the document, resolving
    /// up to `options.max_concurrency` targets at once, until a pass makes no
    /// progress. References that stay unresolved (missing targets, cycles,
    /// targets of the wrong kind) are listed in the report and look up as
    /// absent; fetched documents are added to `registry` at the end.
    ///
    /// # Errors
    ///
    /// Returns an error if a referenced document cannot be fetched, or a
    /// cross-document `$ref` is met while no fetcher is configured.
    pub async fn initialize(
        &mut self,
        registry: &mut SchemaRegistry,
        options: &ResolveOptions,
    ) -> Result<InitializeReport, Error> {
        self.clear_lookup_cache();
        registry.register_document(self);
        debug!(
            target: "aperture_oas::resolver",
            base_uri = %self.base_uri(),
            "registered document schemas"
        );

        let resolver = Arc::new(Resolver::new(options));
        let semaphore = Arc::new(Semaphore::new(options.max_concurrency.max(1)));
        let mut report = InitializeReport::default();
        let mut reasons: HashMap<usize, String> = HashMap::new();

        loop {
            let mut collector = PendingCollector::default();
            walk_document(self, &mut collector);
            if collector.pending.is_empty() {
                break;
            }
            report.passes += 1;
            debug!(
                target: "aperture_oas::resolver",
                pass = report.passes,
                pending = collector.pending.len(),
                "resolving references"
            );

            let snapshot = Arc::new(self.clone());
            let mut handles = Vec::with_capacity(collector.pending.len());
            for pending in &collector.pending {
                let snapshot = Arc::clone(&snapshot);
                let resolver = Arc::clone(&resolver);
                let semaphore = Arc::clone(&semaphore);
                let ordinal = pending.ordinal;
                let target = pending.target.clone();
                let follows_chains = pending.follows_chains;
                handles.push(tokio::spawn(async move {
                    let _permit = semaphore
                        .acquire()
                        .await
                        .map_err(|e| Error::reference_error(&target, format!("resolver stopped: {e}")))?;
                    let resolution = resolver.resolve(&snapshot, &target, follows_chains).await?;
                    Ok::<_, Error>((ordinal, resolution))
                }));
            }

            // Every task finishes before the first failure is reported.
            let mut found = HashMap::new();
            let mut first_error = None;
            for handle in handles {
                match handle.await {
                    Ok(Ok((ordinal, Resolution::Found { node, origin }))) => {
                        found.insert(ordinal, (node, origin));
                    }
                    Ok(Ok((ordinal, Resolution::Missing(reason)))) => {
                        reasons.insert(ordinal, reason);
                    }
                    Ok(Err(e)) => {
                        first_error.get_or_insert(e);
                    }
                    Err(e) => {
                        first_error.get_or_insert_with(|| {
                            Error::reference_error(
                                self.base_uri().as_str(),
                                format!("resolution task failed: {e}"),
                            )
                        });
                    }
                }
            }
            if let Some(e) = first_error {
                return Err(e);
            }

            let mut applier = Applier {
                next: 0,
                found,
                rejected: HashMap::new(),
                identified: Vec::new(),
                applied: 0,
            };
            walk_document(self, &mut applier);
            self.clear_lookup_cache();
            for (uri, value) in applier.identified {
                registry.register(&uri, value);
            }
            reasons.extend(applier.rejected);
            report.resolved += applier.applied;
            if applier.applied == 0 {
                break;
            }
        }

        let mut collector = PendingCollector::default();
        walk_document(self, &mut collector);
        for pending in collector.pending {
            let reason = reasons
                .remove(&pending.ordinal)
                .unwrap_or_else(|| "unresolved".to_string());
            warn!(
                target: "aperture_oas::resolver",
                location = %pending.location,
                target_ref = %pending.target,
                reason = %reason,
                "reference left unresolved"
            );
            report.unresolved.push(UnresolvedReference {
                location: pending.location,
                target: pending.target,
                reason,
            });
        }

        for (uri, value) in resolver.fetched_documents() {
            match Url::parse(&uri) {
                Ok(uri) => registry.register(&uri, value.as_ref().clone()),
                Err(e) => warn!(target: "aperture_oas::resolver", uri = %uri, error = %e, "skipping fetched document"),
            }
        }

        info!(
            target: "aperture_oas::resolver",
            resolved = report.resolved,
            unresolved = report.unresolved.len(),
            passes = report.passes,
            "document initialized"
        );
        Ok(report)
    }
}
