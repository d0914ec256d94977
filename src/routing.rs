//! Routing classifier for inbound contact submissions.
//!
//! Maps a submission's declared domain/complexity to the organizational
//! entity that should receive it, plus a human-readable reason. Runs once
//! per submission, before email composition.
//!
//! Matching is exact-string and case-sensitive. Named-domain rules take
//! precedence over the multi-domain escalation rule, which in turn takes
//! precedence over the governance default.

/// The five organizational entities a submission can be routed to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TargetEntity {
    Holdings,
    EduInnovation,
    StrategicInnovations,
    Media,
    Publishing,
}

impl TargetEntity {
    /// Full registered name, as it appears in dispatch emails and API responses.
    pub fn name(self) -> &'static str {
        match self {
            TargetEntity::Holdings => "Vasudheva Holdings Pvt. Ltd.",
            TargetEntity::EduInnovation => "Vasudheva EduInnovation Pvt. Ltd.",
            TargetEntity::StrategicInnovations => "Vasudheva Strategic Innovations Pvt. Ltd.",
            TargetEntity::Media => "Vasudheva Media Pvt. Ltd.",
            TargetEntity::Publishing => "Vasudheva Publishing Pvt. Ltd.",
        }
    }
}

/// Subject-matter category declared on the contact form.
///
/// The form offers a fixed set of labels; anything else (including an
/// empty field) is carried as `Unmatched` and falls through to the
/// escalation/default rules.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Domain<'a> {
    PolicyInstitutions,
    Education,
    BusinessStrategy,
    MediaCommunication,
    Publishing,
    MultipleUnsure,
    Unmatched(&'a str),
}

impl<'a> Domain<'a> {
    /// Parse a form label. Exact match, case-sensitive, no trimming.
    pub fn from_label(label: &'a str) -> Self {
        match label {
            "Policy / Institutions" => Domain::PolicyInstitutions,
            "Education" => Domain::Education,
            "Business / Strategy" => Domain::BusinessStrategy,
            "Media / Communication" => Domain::MediaCommunication,
            "Publishing" => Domain::Publishing,
            "Multiple / Unsure" => Domain::MultipleUnsure,
            other => Domain::Unmatched(other),
        }
    }
}

/// Scope indicator declared on the contact form.
///
/// Only the "Institutional / Systemic" label is significant to routing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Complexity<'a> {
    InstitutionalSystemic,
    Other(&'a str),
}

impl<'a> Complexity<'a> {
    /// Parse a form label. Exact match, case-sensitive, no trimming.
    pub fn from_label(label: &'a str) -> Self {
        match label {
            "Institutional / Systemic" => Complexity::InstitutionalSystemic,
            other => Complexity::Other(other),
        }
    }
}

/// Classification fields of an inbound submission.
///
/// `stakeholder` is accepted on the form and carried through to the
/// dispatch email, but routing does not consult it today.
#[derive(Debug, Clone)]
pub struct RoutingInput {
    pub stakeholder: Option<String>,
    pub domain: String,
    pub complexity: String,
}

impl RoutingInput {
    /// Classify this submission. Pure and total; never fails.
    pub fn classify(&self) -> RoutingDecision {
        classify(&self.domain, &self.complexity)
    }
}

/// Where a submission goes and why.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RoutingDecision {
    pub target_entity: TargetEntity,
    pub routing_reason: &'static str,
}

impl RoutingDecision {
    fn new(target_entity: TargetEntity, routing_reason: &'static str) -> Self {
        Self {
            target_entity,
            routing_reason,
        }
    }
}

/// Map a submission's domain/complexity labels to a routing decision.
///
/// Total over all string inputs: every named domain routes to its entity,
/// escalation catches "Institutional / Systemic" complexity or a
/// "Multiple / Unsure" domain, and everything else lands on the
/// governance default.
pub fn classify(domain: &str, complexity: &str) -> RoutingDecision {
    use Complexity::InstitutionalSystemic;

    match (Domain::from_label(domain), Complexity::from_label(complexity)) {
        (Domain::PolicyInstitutions, _) => RoutingDecision::new(
            TargetEntity::Holdings,
            "Policy matters require governance-level handling",
        ),
        (Domain::Education, _) => {
            RoutingDecision::new(TargetEntity::EduInnovation, "Education-related case")
        }
        (Domain::BusinessStrategy, _) => {
            RoutingDecision::new(TargetEntity::StrategicInnovations, "Business strategy case")
        }
        (Domain::MediaCommunication, _) => {
            RoutingDecision::new(TargetEntity::Media, "Media & communication case")
        }
        (Domain::Publishing, _) => {
            RoutingDecision::new(TargetEntity::Publishing, "Publishing & IP case")
        }
        (Domain::MultipleUnsure, _) | (Domain::Unmatched(_), InstitutionalSystemic) => {
            RoutingDecision::new(TargetEntity::Holdings, "Complex multi-domain case")
        }
        (Domain::Unmatched(_), Complexity::Other(_)) => {
            RoutingDecision::new(TargetEntity::Holdings, "Default governance assessment")
        }
    }
}
