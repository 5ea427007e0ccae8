//! Packing of attested forms into single decimal keys.
//!
//! Layout version 1 (shared with the client decoder):
//!
//! ```text
//! nominal: lemma_id * 10_000  + case  * 1_000  + gender * 100   + number * 10  + slot
//! verbal:  lemma_id * 100_000 + tense * 10_000 + person * 1_000 + number * 100 + reflexive * 10 + slot
//! ```
//!
//! Every dimension owns one decimal digit. `slot` is the variant ordinal
//! plus one, the 1-based ending index the client expects.

use lexis_protocol::{Case, FormId, Gender, LemmaId, Number, Person, Reflexive, Tense};
use thiserror::Error;

pub const FORM_ID_LAYOUT_VERSION: u32 = 1;

/// Lemma identities occupy at most five digits.
pub const MAX_LEMMA_ID: u32 = 99_999;

/// Largest 0-based variant ordinal; its slot digit is 9.
pub const MAX_ORDINAL: usize = 8;

const NOMINAL_LEMMA_FACTOR: u64 = 10_000;
const VERBAL_LEMMA_FACTOR: u64 = 100_000;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CodecError {
    #[error("lemma id {0} is outside 1..=99999")]
    LemmaOutOfRange(u32),
    #[error("variant ordinal {0} is outside 0..=8")]
    OrdinalOutOfRange(usize),
    #[error("form id {form_id} has an invalid {dimension} digit {digit}")]
    InvalidDigit {
        form_id: u64,
        dimension: &'static str,
        digit: u8,
    },
    #[error("form id {0} has an empty variant slot")]
    EmptySlot(u64),
}

/// Grammatical identity of one nominal form.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NominalKey {
    pub lemma_id: LemmaId,
    pub case: Case,
    pub gender: Gender,
    pub number: Number,
    pub ordinal: usize,
}

/// Grammatical identity of one verbal form.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct VerbalKey {
    pub lemma_id: LemmaId,
    pub tense: Tense,
    pub person: Person,
    pub number: Number,
    pub reflexive: Reflexive,
    pub ordinal: usize,
}

fn check_lemma(lemma_id: LemmaId) -> Result<u64, CodecError> {
    match lemma_id.get() {
        id @ 1..=MAX_LEMMA_ID => Ok(u64::from(id)),
        id => Err(CodecError::LemmaOutOfRange(id)),
    }
}

fn check_ordinal(ordinal: usize) -> Result<u64, CodecError> {
    if ordinal > MAX_ORDINAL {
        return Err(CodecError::OrdinalOutOfRange(ordinal));
    }
    Ok(ordinal as u64 + 1)
}

/// Decimal digit at `10^power`.
fn digit_at(value: u64, power: u32) -> u8 {
    ((value / 10u64.pow(power)) % 10) as u8
}

fn decode_digit<T>(
    form_id: u64,
    power: u32,
    dimension: &'static str,
    from_digit: fn(u8) -> Option<T>,
) -> Result<T, CodecError> {
    let digit = digit_at(form_id, power);
    from_digit(digit).ok_or(CodecError::InvalidDigit {
        form_id,
        dimension,
        digit,
    })
}

fn decode_slot(form_id: u64) -> Result<usize, CodecError> {
    match digit_at(form_id, 0) {
        0 => Err(CodecError::EmptySlot(form_id)),
        slot => Ok(usize::from(slot) - 1),
    }
}

fn decode_lemma(form_id: u64, factor: u64) -> Result<LemmaId, CodecError> {
    let lemma = form_id / factor;
    match u32::try_from(lemma) {
        Ok(id @ 1..=MAX_LEMMA_ID) => Ok(LemmaId(id)),
        Ok(id) => Err(CodecError::LemmaOutOfRange(id)),
        Err(_) => Err(CodecError::LemmaOutOfRange(u32::MAX)),
    }
}

impl NominalKey {
    pub fn encode(&self) -> Result<FormId, CodecError> {
        let lemma = check_lemma(self.lemma_id)?;
        let slot = check_ordinal(self.ordinal)?;

        Ok(FormId(
            lemma * NOMINAL_LEMMA_FACTOR
                + u64::from(self.case.digit()) * 1_000
                + u64::from(self.gender.digit()) * 100
                + u64::from(self.number.digit()) * 10
                + slot,
        ))
    }

    pub fn decode(form_id: FormId) -> Result<Self, CodecError> {
        let raw = form_id.get();
        Ok(Self {
            lemma_id: decode_lemma(raw, NOMINAL_LEMMA_FACTOR)?,
            case: decode_digit(raw, 3, "case", Case::from_digit)?,
            gender: decode_digit(raw, 2, "gender", Gender::from_digit)?,
            number: decode_digit(raw, 1, "number", Number::from_digit)?,
            ordinal: decode_slot(raw)?,
        })
    }
}

impl VerbalKey {
    pub fn encode(&self) -> Result<FormId, CodecError> {
        let lemma = check_lemma(self.lemma_id)?;
        let slot = check_ordinal(self.ordinal)?;

        Ok(FormId(
            lemma * VERBAL_LEMMA_FACTOR
                + u64::from(self.tense.digit()) * 10_000
                + u64::from(self.person.digit()) * 1_000
                + u64::from(self.number.digit()) * 100
                + u64::from(self.reflexive.digit()) * 10
                + slot,
        ))
    }

    pub fn decode(form_id: FormId) -> Result<Self, CodecError> {
        let raw = form_id.get();
        Ok(Self {
            lemma_id: decode_lemma(raw, VERBAL_LEMMA_FACTOR)?,
            tense: decode_digit(raw, 4, "tense", Tense::from_digit)?,
            person: decode_digit(raw, 3, "person", Person::from_digit)?,
            number: decode_digit(raw, 2, "number", Number::from_digit)?,
            reflexive: decode_digit(raw, 1, "reflexive", Reflexive::from_digit)?,
            ordinal: decode_slot(raw)?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use proptest::sample::select;

    #[test]
    fn test_known_layout() {
        // 10789 | instr | masc | pl | second ending
        let key = NominalKey {
            lemma_id: LemmaId(10789),
            case: Case::Instrumental,
            gender: Gender::Masculine,
            number: Number::Plural,
            ordinal: 1,
        };
        assert_eq!(key.encode().unwrap(), FormId(107_893_122));

        // 70683 | imp | 3rd | sg | active | third ending
        let key = VerbalKey {
            lemma_id: LemmaId(70683),
            tense: Tense::Imperative,
            person: Person::Third,
            number: Number::Singular,
            reflexive: Reflexive::No,
            ordinal: 2,
        };
        assert_eq!(key.encode().unwrap(), FormId(7_068_323_103));
    }

    #[test]
    fn test_buddho_round_trip() {
        let key = NominalKey {
            lemma_id: LemmaId(12345),
            case: Case::Nominative,
            gender: Gender::Masculine,
            number: Number::Singular,
            ordinal: 0,
        };
        let form_id = key.encode().unwrap();
        assert_eq!(form_id, FormId(123_451_111));
        assert_eq!(NominalKey::decode(form_id).unwrap(), key);
    }

    #[test]
    fn test_encode_rejects_out_of_range() {
        let mut key = NominalKey {
            lemma_id: LemmaId(100_000),
            case: Case::Nominative,
            gender: Gender::Neuter,
            number: Number::Singular,
            ordinal: 0,
        };
        assert_eq!(key.encode(), Err(CodecError::LemmaOutOfRange(100_000)));

        key.lemma_id = LemmaId(0);
        assert_eq!(key.encode(), Err(CodecError::LemmaOutOfRange(0)));

        key.lemma_id = LemmaId(10001);
        key.ordinal = 9;
        assert_eq!(key.encode(), Err(CodecError::OrdinalOutOfRange(9)));
    }

    #[test]
    fn test_decode_rejects_invalid_digits() {
        // case digit 9 does not exist
        assert!(matches!(
            NominalKey::decode(FormId(100_019_111)),
            Err(CodecError::InvalidDigit { dimension: "case", digit: 9, .. })
        ));
        assert_eq!(
            NominalKey::decode(FormId(100_011_110)),
            Err(CodecError::EmptySlot(100_011_110))
        );
        // tense digit 7 does not exist
        assert!(matches!(
            VerbalKey::decode(FormId(7_000_173_101)),
            Err(CodecError::InvalidDigit { dimension: "tense", .. })
        ));
        // reflexive digit 2 does not exist
        assert!(matches!(
            VerbalKey::decode(FormId(7_000_113_121)),
            Err(CodecError::InvalidDigit { dimension: "reflexive", .. })
        ));
    }

    proptest! {
        #[test]
        fn test_nominal_bijection(
            lemma in 1u32..=MAX_LEMMA_ID,
            case in select(Case::ALL),
            gender in select(Gender::ALL),
            number in select(Number::ALL),
            ordinal in 0usize..=MAX_ORDINAL,
        ) {
            let key = NominalKey { lemma_id: LemmaId(lemma), case, gender, number, ordinal };
            let form_id = key.encode().unwrap();
            prop_assert_eq!(NominalKey::decode(form_id).unwrap(), key);
        }

        #[test]
        fn test_verbal_bijection(
            lemma in 1u32..=MAX_LEMMA_ID,
            tense in select(Tense::ALL),
            person in select(Person::ALL),
            number in select(Number::ALL),
            reflexive in select(Reflexive::ALL),
            ordinal in 0usize..=MAX_ORDINAL,
        ) {
            let key = VerbalKey { lemma_id: LemmaId(lemma), tense, person, number, reflexive, ordinal };
            let form_id = key.encode().unwrap();
            prop_assert_eq!(VerbalKey::decode(form_id).unwrap(), key);
        }

        #[test]
        fn test_distinct_keys_never_collide(
            a in (1u32..=MAX_LEMMA_ID, select(Case::ALL), 0usize..=MAX_ORDINAL),
            b in (1u32..=MAX_LEMMA_ID, select(Case::ALL), 0usize..=MAX_ORDINAL),
        ) {
            let key = |(lemma, case, ordinal): (u32, Case, usize)| NominalKey {
                lemma_id: LemmaId(lemma),
                case,
                gender: Gender::Feminine,
                number: Number::Plural,
                ordinal,
            };
            let (ka, kb) = (key(a), key(b));
            prop_assert_eq!(ka == kb, ka.encode().unwrap() == kb.encode().unwrap());
        }
    }
}
