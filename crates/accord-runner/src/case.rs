use accord_check::Aggregate;
use accord_config::ConfigDocument;
use accord_domain::{AttributeValues, DomainError, LifecycleState, ResourceAddress, ResourceSchema};
use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum StepKind {
    /// Converge to the step's configuration.
    Apply,
    /// Import the target by its captured id using the step's configuration,
    /// then compare against the last applied state. Keys equal to or starting
    /// with an `ignore` entry followed by `.` are left out of the comparison.
    Import { ignore: Vec<String> },
}

/// One transition of a lifecycle case.
#[derive(Debug)]
pub struct Step {
    pub description: String,
    pub kind: StepKind,
    pub config: ConfigDocument,
    /// Values the configuration gives the target resource. `None` when the
    /// step does not declare them; identity is then expected to be preserved.
    pub target_values: Option<AttributeValues>,
    pub check: Option<Aggregate>,
}

impl Step {
    pub fn apply(description: impl Into<String>, config: ConfigDocument) -> Self {
        Self {
            description: description.into(),
            kind: StepKind::Apply,
            config,
            target_values: None,
            check: None,
        }
    }

    /// `ignore` names attributes left out of the import comparison.
    pub fn import(description: impl Into<String>, config: ConfigDocument, ignore: &[&str]) -> Self {
        Self {
            description: description.into(),
            kind: StepKind::Import {
                ignore: ignore.iter().map(|k| k.to_string()).collect(),
            },
            config,
            target_values: None,
            check: None,
        }
    }

    pub fn with_values(mut self, values: AttributeValues) -> Self {
        self.target_values = Some(values);
        self
    }

    pub fn with_check(mut self, check: Aggregate) -> Self {
        self.check = Some(check);
        self
    }

    pub fn kind_name(&self) -> &'static str {
        match self.kind {
            StepKind::Apply => "apply",
            StepKind::Import { .. } => "import",
        }
    }
}

/// The full lifecycle of one resource type: ordered steps plus what
/// "destroyed" means for it.
#[derive(Debug)]
pub struct LifecycleCase {
    pub name: String,
    pub target: ResourceAddress,
    pub schema: ResourceSchema,
    pub steps: Vec<Step>,
    /// Lifecycle states that count as destroyed when the resource is still readable.
    pub deleted_states: Vec<LifecycleState>,
}

impl LifecycleCase {
    pub fn new(name: impl Into<String>, target: ResourceAddress, schema: ResourceSchema) -> Self {
        Self {
            name: name.into(),
            target,
            schema,
            steps: Vec::new(),
            deleted_states: LifecycleState::DELETED.to_vec(),
        }
    }

    pub fn step(mut self, step: Step) -> Self {
        self.steps.push(step);
        self
    }

    /// Every step's declared values must name attributes the schema knows.
    pub fn validate(&self) -> Result<(), DomainError> {
        self.steps
            .iter()
            .filter_map(|s| s.target_values.as_ref())
            .try_for_each(|values| self.schema.check_known(values))
    }
}
