use std::collections::BTreeMap;
use std::sync::LazyLock;

use crate::errors::internal::ValidationError;

/// Religions in display order
pub const RELIGIONS: [&str; 10] = [
    "Hinduism",
    "Islam",
    "Christianity",
    "Sikhism",
    "Buddhism",
    "Adivasi",
    "Jainism",
    "Judaism",
    "No Religion",
    "Others",
];

const HINDUISM: &[&str] = &[
    "Reddy", "Kamma", "Naidu", "Kapus", "Balija", "Chettiar", "Vanniyar", "Gounder", "Iyer",
    "Iyengar", "Lingayat", "Vokkaliga", "Nair", "Menon", "Ezhava", "Mukkulathor", "Mudaliar",
    "Pillai", "Nadars", "Brahmin (Saraswat)", "Brahmin (Gaur)", "Brahmin (Kanyakubj)", "Rajput",
    "Jat", "Yadav", "Kurmi", "Kayastha", "Agarwal", "Bhumihar", "Chamar", "Khatik", "Bania",
    "Thakur", "Lodhi", "Saini", "Gupta", "Teli", "Meena", "Chaurasia", "Ahir", "Maratha", "Kunbi",
    "Patel", "Leva Patel", "Modh", "Koli", "Bhandari", "Lohana", "Brahmin (Deshastha)",
    "Brahmin (Chitpavan)", "Mahadev Koli", "Mali", "Gurjar", "Brahmin (Kulin)", "Baidya",
    "Namasudra", "Sadgop", "Karana", "Khandayat", "Bauri", "Poddar", "Mahishya",
    "Brahmin (Radhi)", "Brahmin (Varendra)", "Vaishya", "Chaudhary", "Goud", "Thiyya", "Velama",
    "Ravidas", "Meghwal",
];

const ISLAM: &[&str] = &[
    "Syed", "Shaikh", "Pathan", "Mughal", "Ansari", "Qureshi", "Teli", "Mallah", "Khan",
    "Rajput Muslim", "Darzi", "Fakir", "Qassab", "Bohra", "Khoja", "Memons", "Dawoodi Bohra",
    "Siddis", "Kutchi Muslims", "Mapilla", "Labbai", "Dudekula", "Sheikh Maraikayar", "Sheikh",
    "Pirzada", "Julaha", "Ghosi", "Choudhary", "Dhobi Muslim", "Nai Muslim", "Kasai", "Hajjam",
    "Bhangi Muslim", "Meo", "Momin", "Sayyid", "Qazi", "Shaikh Siddiqui",
];

const CHRISTIANITY: &[&str] = &[
    "Syrian Christian", "Latin Catholic", "Malankara Catholic", "Malabar Catholic", "Knanaya",
    "Anglo-Indian", "Nadar Christian", "Paravar Christian", "Mukkulathor Christian",
    "Vellalar Christian", "Goan Catholic", "Mangalorean Catholic", "East Indian Catholic",
    "Adivasi Christian", "Santhal Christian", "Oraon Christian", "Kuki Christian",
    "Mizo Christian", "Khasi Christian", "Garo Christian", "Bodo Christian", "Roman Catholic",
    "Protestant", "Anglican", "Dalit Christian", "Scheduled Caste Christian", "Tribal Christian",
    "Converted Christian", "Pentecostal", "Baptist", "Methodist", "Evangelical",
    "Seventh-day Adventist",
];

const SIKHISM: &[&str] = &[
    "Jat", "Khatri", "Arora", "Ramgarhia", "Ahluwalia", "Majhabi", "Labana", "Ravidasia",
    "Mazhabi", "Saini", "Rai", "Nai", "Kalal", "Bhatia", "Ramdasiya", "Kamboj", "Tarkhan",
    "Ghumar", "Balmiki",
];

const BUDDHISM: &[&str] = &[
    "Navayana Buddhist", "Mahar", "Scheduled Caste Buddhist", "Baiga", "Bhutia",
    "Tibetan Buddhist", "Ladakhi Buddhist", "Tamang", "Sherpa", "Lepcha", "Chakma", "Barua",
    "Gurung", "Newar Buddhist", "Magar", "Theravada Buddhist", "Neo-Buddhist",
];

const ADIVASI: &[&str] = &[
    "Santhal", "Gond", "Bhil", "Munda", "Oraon", "Khasi", "Garo", "Meena", "Ho", "Baiga", "Bodo",
    "Kuki", "Naga", "Lepcha", "Jarwa", "Chenchu", "Siddi", "Toto", "Sahariya", "Korwa", "Mizo",
    "Toda", "Irula", "Koya", "Rabha", "Khas", "Bhutia", "Kol", "Dongria Kondh", "Halbi", "Khond",
    "Pahari Korwa", "Birhor",
];

const JAINISM: &[&str] = &[
    "Agarwal Jain", "Oswal", "Porwal", "Shrimal Jain", "Khandelwal Jain",
    "Chandraseniya Kayastha Prabhu (CKP)", "Saitwal", "Digambar Jain", "Shwetambar Jain",
    "Sthanakvasi", "Terapanthi", "Humad", "Panchama", "Visa Oswal", "Modh Jain",
    "Prajapati Jain", "Kutchi Jain", "Dasha Shrimali Jain", "Bisa Oswal",
];

const JUDAISM: &[&str] = &[
    "Cochin Jews", "Bene Israel", "Baghdadi Jews", "Bene Ephraim", "Manipuri Jews", "Bnei Menashe",
];

const OTHERS: &[&str] = &["Other"];

/// Religion → alphabetically ordered, de-duplicated cast list.
/// "No Religion" has no casts.
static CAST_MAP: LazyLock<BTreeMap<&'static str, Vec<&'static str>>> = LazyLock::new(|| {
    let raw: [(&str, &[&str]); 9] = [
        ("Hinduism", HINDUISM),
        ("Islam", ISLAM),
        ("Christianity", CHRISTIANITY),
        ("Sikhism", SIKHISM),
        ("Buddhism", BUDDHISM),
        ("Adivasi", ADIVASI),
        ("Jainism", JAINISM),
        ("Judaism", JUDAISM),
        ("Others", OTHERS),
    ];

    raw.into_iter()
        .map(|(religion, casts)| {
            let mut casts = casts.to_vec();
            casts.sort_unstable();
            casts.dedup();
            (religion, casts)
        })
        .collect()
});

pub fn is_religion(value: &str) -> bool {
    RELIGIONS.contains(&value)
}

/// Cast list for a religion; empty for "No Religion" and unknown religions
pub fn casts_for(religion: &str) -> &'static [&'static str] {
    CAST_MAP
        .get(religion)
        .map(|casts| casts.as_slice())
        .unwrap_or(&[])
}

/// Check a religion/cast pair against the closed vocabulary
///
/// # Errors
/// * `UnknownReligion` - religion outside [`RELIGIONS`]
/// * `CastNotInReligion` - cast not listed for that religion
/// * `CastWithoutReligion` - cast set while religion is not
pub fn validate_group(religion: Option<&str>, cast: Option<&str>) -> Result<(), ValidationError> {
    match (religion, cast) {
        (None, None) => Ok(()),
        (None, Some(cast)) => Err(ValidationError::CastWithoutReligion(cast.to_string())),
        (Some(religion), _) if !is_religion(religion) => {
            Err(ValidationError::UnknownReligion(religion.to_string()))
        }
        (Some(_), None) => Ok(()),
        (Some(religion), Some(cast)) => {
            if casts_for(religion).contains(&cast) {
                Ok(())
            } else {
                Err(ValidationError::CastNotInReligion {
                    religion: religion.to_string(),
                    cast: cast.to_string(),
                })
            }
        }
    }
}

/// Full vocabulary in display order, for the client forms
pub fn vocabulary() -> Vec<(&'static str, &'static [&'static str])> {
    RELIGIONS
        .iter()
        .map(|religion| (*religion, casts_for(religion)))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cast_lists_are_sorted_and_unique() {
        for religion in RELIGIONS {
            let casts = casts_for(religion);
            let mut expected = casts.to_vec();
            expected.sort_unstable();
            expected.dedup();
            assert_eq!(casts, expected.as_slice(), "{religion}");
        }
    }

    #[test]
    fn test_duplicated_source_entries_collapse() {
        let hinduism = casts_for("Hinduism");
        assert_eq!(hinduism.iter().filter(|c| **c == "Kayastha").count(), 1);
        assert_eq!(hinduism.iter().filter(|c| **c == "Koli").count(), 1);
    }

    #[test]
    fn test_no_religion_has_no_casts() {
        assert!(is_religion("No Religion"));
        assert!(casts_for("No Religion").is_empty());
        assert_eq!(casts_for("Others"), &["Other"]);
    }

    #[test]
    fn test_validate_group_accepts_known_pairs() {
        assert!(validate_group(None, None).is_ok());
        assert!(validate_group(Some("Hinduism"), None).is_ok());
        assert!(validate_group(Some("Hinduism"), Some("Reddy")).is_ok());
        assert!(validate_group(Some("Sikhism"), Some("Jat")).is_ok());
    }

    #[test]
    fn test_validate_group_rejects_mismatches() {
        assert_eq!(
            validate_group(Some("Atlantis"), None),
            Err(ValidationError::UnknownReligion("Atlantis".to_string()))
        );
        assert_eq!(
            validate_group(Some("Islam"), Some("Reddy")),
            Err(ValidationError::CastNotInReligion {
                religion: "Islam".to_string(),
                cast: "Reddy".to_string(),
            })
        );
        assert_eq!(
            validate_group(None, Some("Reddy")),
            Err(ValidationError::CastWithoutReligion("Reddy".to_string()))
        );
        assert!(validate_group(Some("No Religion"), Some("Other")).is_err());
    }

    #[test]
    fn test_vocabulary_follows_religion_order() {
        let names: Vec<&str> = vocabulary().into_iter().map(|(religion, _)| religion).collect();
        assert_eq!(names, RELIGIONS.to_vec());
    }
}
