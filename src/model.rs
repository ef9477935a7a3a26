use serde::{Deserialize, Serialize};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Alignment {
    Left,
    Center,
    Right,
    Justify,
}

impl Alignment {
    /// The `w:jc` attribute value for this alignment.
    pub(crate) fn jc_val(self) -> &'static str {
        match self {
            Alignment::Left => "left",
            Alignment::Center => "center",
            Alignment::Right => "right",
            Alignment::Justify => "both",
        }
    }

    pub(crate) fn from_jc(val: &str) -> Alignment {
        match val {
            "center" => Alignment::Center,
            "right" | "end" => Alignment::Right,
            "both" | "distribute" => Alignment::Justify,
            _ => Alignment::Left,
        }
    }
}

#[derive(Clone, Copy, Debug)]
pub enum LineSpacing {
    /// Fixed line height in points (`w:lineRule="exact"`).
    Exact(f32),
    /// Multiplier relative to single spacing (1.5 = one-and-a-half).
    Multiple(f32),
}

/// Semantic category of a paragraph within an official-style document.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Role {
    Title,
    Recipient,
    Heading1,
    Heading2,
    Heading3,
    Heading4,
    Body,
    Signature,
    Date,
    Attachment,
    Closing,
    Empty,
}

impl Role {
    pub(crate) const ALL: [Role; 12] = [
        Role::Title,
        Role::Recipient,
        Role::Heading1,
        Role::Heading2,
        Role::Heading3,
        Role::Heading4,
        Role::Body,
        Role::Signature,
        Role::Date,
        Role::Attachment,
        Role::Closing,
        Role::Empty,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Role::Title => "title",
            Role::Recipient => "recipient",
            Role::Heading1 => "heading1",
            Role::Heading2 => "heading2",
            Role::Heading3 => "heading3",
            Role::Heading4 => "heading4",
            Role::Body => "body",
            Role::Signature => "signature",
            Role::Date => "date",
            Role::Attachment => "attachment",
            Role::Closing => "closing",
            Role::Empty => "empty",
        }
    }

    fn index(self) -> usize {
        Role::ALL.iter().position(|r| *r == self).unwrap_or(0)
    }
}

/// Per-role paragraph counts reported by the pipeline.
#[derive(Clone, Debug, Default)]
pub struct Summary {
    counts: [usize; Role::ALL.len()],
}

impl Summary {
    pub(crate) fn record(&mut self, role: Role) {
        self.counts[role.index()] += 1;
    }

    pub fn count(&self, role: Role) -> usize {
        self.counts[role.index()]
    }

    pub fn total(&self) -> usize {
        self.counts.iter().sum()
    }

    /// Roles that occurred at least once, in declaration order.
    pub fn nonzero(&self) -> impl Iterator<Item = (Role, usize)> + '_ {
        Role::ALL
            .iter()
            .map(|r| (*r, self.count(*r)))
            .filter(|(_, n)| *n > 0)
    }
}

impl std::fmt::Display for Summary {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        for (role, n) in self.nonzero() {
            writeln!(f, "  {:<10} {}", role.name(), n)?;
        }
        Ok(())
    }
}
