use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "gender", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum Gender {
    Male,
    Female,
}

impl Gender {
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "male" => Some(Gender::Male),
            "female" => Some(Gender::Female),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "student_status", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum StudentStatus {
    Active,
    Graduated,
    Transferred,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Student {
    pub id: i64,
    pub name: String,
    pub gender: Gender,
    pub birth_date: NaiveDate,
    pub class_id: Option<i64>,
    pub parent_name: String,
    pub parent_phone: String,
    pub parent_email: Option<String>,
    pub address: Option<String>,
    pub status: StudentStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Student {
    pub fn age_on(&self, today: NaiveDate) -> i32 {
        let mut age = today.years_since(self.birth_date).unwrap_or(0) as i32;
        if self.birth_date > today {
            age = 0;
        }
        age
    }
}

/// Mainland mobile number check shared by student and enrollment validation.
pub fn is_valid_cn_mobile(phone: &str) -> bool {
    let bytes = phone.as_bytes();
    bytes.len() == 11
        && bytes[0] == b'1'
        && (b'3'..=b'9').contains(&bytes[1])
        && bytes.iter().all(u8::is_ascii_digit)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn gender_parse_accepts_only_male_or_female() {
        assert_eq!(Gender::parse("male"), Some(Gender::Male));
        assert_eq!(Gender::parse("female"), Some(Gender::Female));
        assert_eq!(Gender::parse("MALE"), None);
        assert_eq!(Gender::parse("other"), None);
    }

    #[test]
    fn cn_mobile_validation() {
        assert!(is_valid_cn_mobile("13800138000"));
        assert!(is_valid_cn_mobile("19912345678"));
        assert!(!is_valid_cn_mobile("12345678901"));
        assert!(!is_valid_cn_mobile("1380013800"));
        assert!(!is_valid_cn_mobile("138001380001"));
        assert!(!is_valid_cn_mobile("1380013800a"));
        assert!(!is_valid_cn_mobile(""));
    }

    #[test]
    fn age_is_computed_from_birth_date() {
        let student = Student {
            id: 1,
            name: "小明".to_string(),
            gender: Gender::Male,
            birth_date: NaiveDate::from_ymd_opt(2020, 6, 1).unwrap(),
            class_id: None,
            parent_name: "王芳".to_string(),
            parent_phone: "13800138000".to_string(),
            parent_email: None,
            address: None,
            status: StudentStatus::Active,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        };

        let today = NaiveDate::from_ymd_opt(2025, 6, 2).unwrap();
        assert_eq!(student.age_on(today), 5);

        let before_birthday = NaiveDate::from_ymd_opt(2025, 5, 31).unwrap();
        assert_eq!(student.age_on(before_birthday), 4);
    }
}
