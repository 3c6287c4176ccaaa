//! Which modal, if any, is open on top of a page.
//!
//! At most one overlay is active at a time; opening one replaces whatever was open.

/// The overlay currently shown.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ActiveOverlay {
    /// Nothing open
    #[default]
    None,
    /// Due creation form
    AddDue,
    /// Payment filter panel
    Filter,
    /// Payment sort panel
    Sort,
    /// Receipt for a payment
    Receipt {
        /// Payment being shown
        payment_id: i64,
    },
    /// Share sheet for a payment receipt
    Share {
        /// Payment being shared
        payment_id: i64,
    },
    /// Student creation form
    AddStudent,
    /// Student details
    ViewStudent {
        /// Store ID of the student
        student_id: i64,
    },
    /// Student edit form
    EditStudent {
        /// Store ID of the student
        student_id: i64,
    },
    /// Student delete confirmation
    DeleteStudent {
        /// Store ID of the student
        student_id: i64,
    },
}

impl ActiveOverlay {
    /// Opens `overlay`, replacing the current one.
    pub fn open(&mut self, overlay: Self) {
        *self = overlay;
    }

    /// Closes whatever is open.
    pub fn close(&mut self) {
        *self = Self::None;
    }

    /// Whether any overlay is open.
    #[must_use]
    pub const fn is_open(&self) -> bool {
        !matches!(self, Self::None)
    }

    /// The payment an overlay is about, if any.
    #[must_use]
    pub const fn payment_id(&self) -> Option<i64> {
        match self {
            Self::Receipt { payment_id } | Self::Share { payment_id } => Some(*payment_id),
            _ => None,
        }
    }

    /// The student an overlay is about, if any.
    #[must_use]
    pub const fn student_id(&self) -> Option<i64> {
        match self {
            Self::ViewStudent { student_id }
            | Self::EditStudent { student_id }
            | Self::DeleteStudent { student_id } => Some(*student_id),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_opening_replaces_current_overlay() {
        let mut overlay = ActiveOverlay::default();
        assert!(!overlay.is_open());

        overlay.open(ActiveOverlay::Receipt { payment_id: 4 });
        assert_eq!(overlay.payment_id(), Some(4));

        overlay.open(ActiveOverlay::EditStudent { student_id: 9 });
        assert_eq!(overlay, ActiveOverlay::EditStudent { student_id: 9 });
        assert_eq!(overlay.payment_id(), None);
        assert_eq!(overlay.student_id(), Some(9));
    }

    #[test]
    fn test_close_returns_to_none() {
        let mut overlay = ActiveOverlay::Filter;
        overlay.close();
        assert_eq!(overlay, ActiveOverlay::None);
        assert_eq!(overlay.student_id(), None);
    }
}
