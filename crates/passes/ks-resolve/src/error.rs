//! Error types for scope resolution

use ks_intern::{Interner, Symbol};
use ks_span::FileSpan;

/// Fatal diagnostics raised during scope resolution
///
/// Every variant aborts the pass immediately; nothing is retried or
/// recovered. A name that simply fails to resolve is not an error here —
/// a later validation pass reports undeclared names.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ResolveError {
    /// A type alias's inlined copy still contains an alias reference
    #[error("recursive type alias at {site:?}")]
    RecursiveAlias {
        /// The alias the inlined copy still refers to
        name: Symbol,
        /// Where the recursive reference sits
        site: FileSpan,
    },

    /// Implicit break/continue with no enclosing loop
    #[error("break or continue outside a loop at {site:?}")]
    GotoOutsideLoop {
        /// The break/continue location
        site: FileSpan,
    },

    /// Qualified enum access names a constant the enum does not declare
    #[error("unresolved enum member at {site:?}")]
    UnresolvedEnumMember {
        /// The member name that was not found
        member: Symbol,
        /// The dot expression's location
        site: FileSpan,
    },

    /// A break/continue node carries a goto kind this pass does not handle;
    /// signals a defect in an upstream stage, not bad user input
    #[error("unexpected goto kind at {site:?}")]
    UnexpectedGotoKind {
        /// The offending node's location
        site: FileSpan,
    },
}

impl ResolveError {
    /// Whether this diagnostic reports a compiler defect rather than an
    /// error in user code
    pub fn is_internal(&self) -> bool {
        matches!(self, Self::UnexpectedGotoKind { .. })
    }

    /// Source position the diagnostic points at
    pub fn site(&self) -> FileSpan {
        match self {
            Self::RecursiveAlias { site, .. }
            | Self::GotoOutsideLoop { site }
            | Self::UnresolvedEnumMember { site, .. }
            | Self::UnexpectedGotoKind { site } => *site,
        }
    }

    /// User-facing message with identifiers spelled out
    pub fn render(&self, interner: &Interner) -> String {
        match self {
            Self::RecursiveAlias { .. } => "type alias is recursive".to_string(),
            Self::GotoOutsideLoop { .. } => "break or continue is not in a loop".to_string(),
            Self::UnresolvedEnumMember { member, .. } => format!(
                "unresolved enumerated type symbol \"{}\"",
                interner.resolve(member)
            ),
            Self::UnexpectedGotoKind { .. } => "unexpected goto kind".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_render_names_the_enum_member() {
        let interner = Interner::new();
        let error = ResolveError::UnresolvedEnumMember {
            member: interner.intern("Purple"),
            site: FileSpan::synthetic(),
        };
        assert_eq!(
            error.render(&interner),
            "unresolved enumerated type symbol \"Purple\""
        );
        assert!(!error.is_internal());
    }

    #[test]
    fn test_unexpected_goto_kind_is_internal() {
        let error = ResolveError::UnexpectedGotoKind {
            site: FileSpan::synthetic(),
        };
        assert!(error.is_internal());
    }
}
