use nova_types::{format_member_signature, Diagnostic};
use serde::Serialize;

use crate::gated::GatedMember;
use crate::verdict::{IncompatibleReason, Verdict};

/// Flat, serializable outcome for one verified member.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct CompatRecord {
    /// The class the member was verified through.
    pub owner_class: String,
    /// The class that declares the member; differs from `owner_class` for inherited members.
    pub declaring_class: String,
    pub member_name: String,
    pub signature: String,
    pub required_api: u32,
    pub verdict: Verdict,
    pub reason: Option<IncompatibleReason>,
}

impl CompatRecord {
    pub fn new(gated: &GatedMember, verdict: &Verdict) -> Self {
        Self {
            owner_class: gated.receiver.clone(),
            declaring_class: gated.owner.clone(),
            member_name: gated.member.name.clone(),
            signature: format_member_signature(&gated.member),
            required_api: gated.required_api,
            verdict: verdict.clone(),
            reason: verdict.reason(),
        }
    }
}

/// Verdicts for every gated member of one class.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ClassReport {
    pub class: String,
    pub min_api: u32,
    pub entries: Vec<(GatedMember, Verdict)>,
}

impl ClassReport {
    pub fn records(&self) -> Vec<CompatRecord> {
        self.entries
            .iter()
            .map(|(gated, verdict)| CompatRecord::new(gated, verdict))
            .collect()
    }

    /// One error per member without a usable shim counterpart.
    pub fn diagnostics(&self) -> Vec<Diagnostic> {
        self.entries
            .iter()
            .filter(|(_, verdict)| !verdict.is_compatible())
            .map(|(gated, verdict)| {
                let detail = match verdict {
                    Verdict::Incompatible(reason) => reason.describe(),
                    Verdict::NoCandidate | Verdict::Compatible => {
                        format!("no shim member named `{}`", gated.member.name)
                    }
                };
                Diagnostic::error(
                    verdict.code(),
                    format!(
                        "Call requires API level {} (current min is {}): {}#{} ({detail})",
                        gated.required_api, self.min_api, gated.receiver, gated.member.name
                    ),
                )
            })
            .collect()
    }

    /// Verdict of the first member named `name`.
    pub fn verdict_for(&self, name: &str) -> Option<&Verdict> {
        self.entries
            .iter()
            .find(|(gated, _)| gated.member.name == name)
            .map(|(_, verdict)| verdict)
    }

    pub fn is_clean(&self) -> bool {
        self.entries.iter().all(|(_, verdict)| verdict.is_compatible())
    }
}
