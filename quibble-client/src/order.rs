use std::cmp::Reverse;

use crate::api::Comment;

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum SortField {
    Author,
    Email,
    CreationDate,
}

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum SortDirection {
    Asc,
    Desc,
}

impl SortDirection {
    fn flipped(self) -> SortDirection {
        match self {
            SortDirection::Asc => SortDirection::Desc,
            SortDirection::Desc => SortDirection::Asc,
        }
    }
}

impl SortField {
    /// Direction a field starts in when it becomes the active sort.
    /// Creation time reads newest-first, names read alphabetically.
    fn home_direction(self) -> SortDirection {
        match self {
            SortField::CreationDate => SortDirection::Desc,
            SortField::Author | SortField::Email => SortDirection::Asc,
        }
    }
}

/// The one active sort of the top-level table: exactly one field and one
/// direction at a time. Reply lists ignore this and always read
/// newest-first.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct Order {
    pub field: SortField,
    pub direction: SortDirection,
}

impl Default for Order {
    fn default() -> Order {
        Order {
            field: SortField::CreationDate,
            direction: SortDirection::Desc,
        }
    }
}

impl Order {
    /// Header-click rule: re-selecting the active field flips it, a new
    /// field starts in its home direction
    pub fn clicked(self, field: SortField) -> Order {
        if self.field == field {
            Order {
                field,
                direction: self.direction.flipped(),
            }
        } else {
            Order {
                field,
                direction: field.home_direction(),
            }
        }
    }

    /// Stable, so comments with equal keys keep the store's order
    pub fn sort(&self, comments: &mut [Comment]) {
        match (self.field, self.direction) {
            (SortField::Author, SortDirection::Asc) => {
                comments.sort_by(|a, b| a.username.cmp(&b.username))
            }
            (SortField::Author, SortDirection::Desc) => {
                comments.sort_by(|a, b| b.username.cmp(&a.username))
            }
            (SortField::Email, SortDirection::Asc) => {
                comments.sort_by(|a, b| a.email.cmp(&b.email))
            }
            (SortField::Email, SortDirection::Desc) => {
                comments.sort_by(|a, b| b.email.cmp(&a.email))
            }
            (SortField::CreationDate, SortDirection::Asc) => {
                comments.sort_by_key(|c| c.created_at)
            }
            (SortField::CreationDate, SortDirection::Desc) => {
                comments.sort_by_key(|c| Reverse(c.created_at))
            }
        }
    }
}
