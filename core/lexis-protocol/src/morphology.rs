use rkyv::{Archive, Deserialize, Serialize};

#[cfg(feature = "serde")]
use serde::{Deserialize as SerdeDeserialize, Serialize as SerdeSerialize};

/// Declares a one-digit grammatical enumeration with a `None = 0` sentinel.
///
/// The digit of every variant is part of the packed form-id layout shared
/// with the client, so variants may be appended but never renumbered.
macro_rules! define_grammeme {
    (
        $(#[$meta:meta])*
        $name:ident {
            $($variant:ident = $digit:literal => $abbr:literal),+ $(,)?
        }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Archive, Serialize, Deserialize)]
        #[cfg_attr(feature = "serde", derive(SerdeDeserialize, SerdeSerialize))]
        #[archive(check_bytes)]
        #[repr(u8)]
        pub enum $name {
            #[default]
            None = 0,
            $($variant = $digit,)+
        }

        impl $name {
            /// Every value including the sentinel, in digit order.
            pub const ALL: &'static [$name] = &[$name::None, $($name::$variant),+];

            /// Every value except the sentinel, in digit order.
            pub const REALISED: &'static [$name] = &[$($name::$variant),+];

            pub const MAX_DIGIT: u8 = {
                let mut max = 0u8;
                $(if $digit > max { max = $digit; })+
                max
            };

            pub const fn digit(self) -> u8 {
                self as u8
            }

            pub const fn from_digit(digit: u8) -> Option<Self> {
                match digit {
                    0 => Some($name::None),
                    $($digit => Some($name::$variant),)+
                    _ => None,
                }
            }

            /// Short form used by reports (`nom`, `sg`, `3rd`, ...).
            pub const fn abbreviation(self) -> &'static str {
                match self {
                    $name::None => "none",
                    $($name::$variant => $abbr,)+
                }
            }

            pub const fn is_none(self) -> bool {
                matches!(self, $name::None)
            }
        }

        const _: () = assert!(
            $name::MAX_DIGIT <= 9,
            concat!(stringify!($name), " no longer fits a single decimal digit")
        );
    };
}

define_grammeme! {
    /// Nominal case.
    Case {
        Nominative = 1 => "nom",
        Accusative = 2 => "acc",
        Instrumental = 3 => "instr",
        Dative = 4 => "dat",
        Ablative = 5 => "abl",
        Genitive = 6 => "gen",
        Locative = 7 => "loc",
        Vocative = 8 => "voc",
    }
}

define_grammeme! {
    Gender {
        Masculine = 1 => "masc",
        Feminine = 2 => "fem",
        Neuter = 3 => "nt",
    }
}

define_grammeme! {
    Number {
        Singular = 1 => "sg",
        Plural = 2 => "pl",
    }
}

define_grammeme! {
    Person {
        First = 1 => "1st",
        Second = 2 => "2nd",
        Third = 3 => "3rd",
    }
}

define_grammeme! {
    /// Verbal tense. The traditional moods (imperative, optative) share this axis.
    Tense {
        Present = 1 => "pr",
        Imperative = 2 => "imp",
        Optative = 3 => "opt",
        Future = 4 => "fut",
        Aorist = 5 => "aor",
    }
}

/// Reflexive (middle) voice marker of a verbal form.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Archive, Serialize, Deserialize)]
#[cfg_attr(feature = "serde", derive(SerdeDeserialize, SerdeSerialize))]
#[archive(check_bytes)]
#[repr(u8)]
pub enum Reflexive {
    #[default]
    No = 0,
    Yes = 1,
}

impl Reflexive {
    pub const ALL: &'static [Reflexive] = &[Reflexive::No, Reflexive::Yes];

    pub const fn digit(self) -> u8 {
        self as u8
    }

    pub const fn from_digit(digit: u8) -> Option<Self> {
        match digit {
            0 => Some(Reflexive::No),
            1 => Some(Reflexive::Yes),
            _ => None,
        }
    }

    pub const fn is_reflexive(self) -> bool {
        matches!(self, Reflexive::Yes)
    }
}

/// Part-of-speech family a lemma is registered under.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Archive, Serialize, Deserialize)]
#[cfg_attr(feature = "serde", derive(SerdeDeserialize, SerdeSerialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
#[archive(check_bytes)]
#[repr(u8)]
pub enum PosFamily {
    Noun = 0,
    Verb = 1,
}

impl PosFamily {
    pub const fn name(self) -> &'static str {
        match self {
            PosFamily::Noun => "noun",
            PosFamily::Verb => "verb",
        }
    }
}

impl core::fmt::Display for PosFamily {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.name())
    }
}

/// Gender implied by a headword's part-of-speech tag (`masc`, `fem`, `nt`).
pub fn gender_from_pos(pos: &str) -> Gender {
    let pos = pos.trim();
    if pos.eq_ignore_ascii_case("masc") || pos.eq_ignore_ascii_case("masculine") {
        Gender::Masculine
    } else if pos.eq_ignore_ascii_case("fem") || pos.eq_ignore_ascii_case("feminine") {
        Gender::Feminine
    } else if pos.eq_ignore_ascii_case("nt")
        || pos.eq_ignore_ascii_case("neut")
        || pos.eq_ignore_ascii_case("neuter")
    {
        Gender::Neuter
    } else {
        // abstr, act, agent, dimin, ...
        Gender::None
    }
}
