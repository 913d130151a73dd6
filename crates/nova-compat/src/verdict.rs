use serde::Serialize;

/// Why a shim counterpart is not a valid substitute.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum IncompatibleReason {
    ShimMemberNotStatic,
    ParameterArityMismatch,
    /// `position` indexes the shim's parameter list; for instance members `0` is the receiver.
    ParameterTypeMismatch { position: usize },
    ReturnTypeMismatch,
    TypeParameterArityMismatch,
}

impl IncompatibleReason {
    pub fn code(self) -> &'static str {
        match self {
            IncompatibleReason::ShimMemberNotStatic => "COMPAT_NOT_STATIC",
            IncompatibleReason::ParameterArityMismatch => "COMPAT_PARAM_ARITY",
            IncompatibleReason::ParameterTypeMismatch { .. } => "COMPAT_PARAM_TYPE",
            IncompatibleReason::ReturnTypeMismatch => "COMPAT_RETURN_TYPE",
            IncompatibleReason::TypeParameterArityMismatch => "COMPAT_TYPE_PARAM_ARITY",
        }
    }

    pub fn describe(self) -> String {
        match self {
            IncompatibleReason::ShimMemberNotStatic => "shim member is not static".to_string(),
            IncompatibleReason::ParameterArityMismatch => {
                "shim member takes a different number of parameters".to_string()
            }
            IncompatibleReason::ParameterTypeMismatch { position: 0 } => {
                "shim receiver parameter does not accept this receiver".to_string()
            }
            IncompatibleReason::ParameterTypeMismatch { position } => {
                format!("shim parameter {position} has an incompatible type")
            }
            IncompatibleReason::ReturnTypeMismatch => {
                "shim return type is not compatible with the declared return type".to_string()
            }
            IncompatibleReason::TypeParameterArityMismatch => {
                "shim member declares a different number of type parameters".to_string()
            }
        }
    }
}

/// Per-member outcome of the compatibility check.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize)]
#[serde(tag = "kind", content = "reason", rename_all = "snake_case")]
pub enum Verdict {
    Compatible,
    Incompatible(IncompatibleReason),
    NoCandidate,
}

impl Verdict {
    pub fn is_compatible(&self) -> bool {
        matches!(self, Verdict::Compatible)
    }

    pub fn reason(&self) -> Option<IncompatibleReason> {
        match self {
            Verdict::Incompatible(reason) => Some(*reason),
            Verdict::Compatible | Verdict::NoCandidate => None,
        }
    }

    pub fn code(&self) -> &'static str {
        match self {
            Verdict::Compatible => "COMPAT_OK",
            Verdict::Incompatible(reason) => reason.code(),
            Verdict::NoCandidate => "COMPAT_NO_CANDIDATE",
        }
    }
}
