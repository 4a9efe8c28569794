//! Ordered validation rule chain for profile submissions.
//!
//! Rules run in a fixed order and the first failing rule is the only one
//! reported. No I/O happens here; the only external input is the clock used
//! for the date-of-birth check, which callers pass in explicitly.

use std::sync::LazyLock;

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use regex::Regex;
use url::Url;
use validator::ValidateLength;

use crate::models::profile::{MembershipStatus, ProfileField, ProfileSubmission, ProfileUpdate};

static EMAIL_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").expect("email pattern is valid")
});

// optional `+`, no leading zero, 2-15 digits total
static PHONE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\+?[1-9][0-9]{1,14}$").expect("phone pattern is valid"));

pub const MAX_BIO_CHARS: u64 = 500;
pub const MAX_AVIATION_FIELD_CHARS: u64 = 100;

/// A single rule violation
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum Violation {
    #[error("All fields are required.")]
    MissingField(ProfileField),
    #[error("Invalid email format.")]
    InvalidEmail,
    #[error("Invalid phone number format.")]
    InvalidPhone,
    #[error("Invalid date of birth.")]
    InvalidBirthDate,
    #[error("Invalid profile picture URL.")]
    InvalidUrl,
    #[error("Invalid membership status.")]
    InvalidMembershipStatus,
    #[error("Bio must be 500 characters or less.")]
    BioTooLong,
    #[error("{} must be 100 characters or less.", .0.label())]
    FieldTooLong(ProfileField),
}

/// One step of the validation chain
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Rule {
    Presence,
    EmailSyntax,
    PhoneSyntax,
    BirthDateNotInFuture,
    PictureUrl,
    Membership,
    BioLength,
    MaxLength(ProfileField),
}

/// Evaluation order. Presence must stay first: later rules read fields
/// without re-checking that they exist.
pub const RULE_CHAIN: [Rule; 10] = [
    Rule::Presence,
    Rule::EmailSyntax,
    Rule::PhoneSyntax,
    Rule::BirthDateNotInFuture,
    Rule::PictureUrl,
    Rule::Membership,
    Rule::BioLength,
    Rule::MaxLength(ProfileField::FlightExperienceLevel),
    Rule::MaxLength(ProfileField::PreferredAircraft),
    Rule::MaxLength(ProfileField::FavoriteDestinations),
];

impl Rule {
    pub fn check(self, submission: &ProfileSubmission, now: DateTime<Utc>) -> Result<(), Violation> {
        let value = |field: ProfileField| submission.get(field).map(String::as_str).unwrap_or("");

        match self {
            Rule::Presence => ProfileField::ALL
                .into_iter()
                .find(|field| value(*field).is_empty())
                .map_or(Ok(()), |field| Err(Violation::MissingField(field))),
            Rule::EmailSyntax => ensure(
                EMAIL_RE.is_match(value(ProfileField::Email)),
                Violation::InvalidEmail,
            ),
            Rule::PhoneSyntax => ensure(
                PHONE_RE.is_match(value(ProfileField::PhoneNumber)),
                Violation::InvalidPhone,
            ),
            Rule::BirthDateNotInFuture => ensure(
                parse_birth_date(value(ProfileField::DateOfBirth)).is_some_and(|dob| dob <= now),
                Violation::InvalidBirthDate,
            ),
            Rule::PictureUrl => ensure(
                is_absolute_url(value(ProfileField::ProfilePictureUrl)),
                Violation::InvalidUrl,
            ),
            Rule::Membership => ensure(
                MembershipStatus::parse(value(ProfileField::MembershipStatus)).is_some(),
                Violation::InvalidMembershipStatus,
            ),
            Rule::BioLength => ensure(
                within(submission.get(ProfileField::Bio), MAX_BIO_CHARS),
                Violation::BioTooLong,
            ),
            Rule::MaxLength(field) => ensure(
                within(submission.get(field), MAX_AVIATION_FIELD_CHARS),
                Violation::FieldTooLong(field),
            ),
        }
    }
}

/// Run the rule chain and, on success, produce the validated update.
pub fn validate_profile(
    submission: &ProfileSubmission,
    now: DateTime<Utc>,
) -> Result<ProfileUpdate, Violation> {
    for rule in RULE_CHAIN {
        rule.check(submission, now)?;
    }

    let take = |field: ProfileField| {
        submission
            .get(field)
            .cloned()
            .ok_or(Violation::MissingField(field))
    };

    let membership_status = MembershipStatus::parse(&take(ProfileField::MembershipStatus)?)
        .ok_or(Violation::InvalidMembershipStatus)?;

    Ok(ProfileUpdate {
        username: take(ProfileField::Username)?,
        email: take(ProfileField::Email)?,
        first_name: take(ProfileField::FirstName)?,
        last_name: take(ProfileField::LastName)?,
        date_of_birth: take(ProfileField::DateOfBirth)?,
        address: take(ProfileField::Address)?,
        phone_number: take(ProfileField::PhoneNumber)?,
        profile_picture_url: take(ProfileField::ProfilePictureUrl)?,
        bio: take(ProfileField::Bio)?,
        flight_experience_level: take(ProfileField::FlightExperienceLevel)?,
        preferred_aircraft: take(ProfileField::PreferredAircraft)?,
        favorite_destinations: take(ProfileField::FavoriteDestinations)?,
        membership_status,
        date_of_account_creation: take(ProfileField::DateOfAccountCreation)?,
        last_login_date: take(ProfileField::LastLoginDate)?,
    })
}

fn ensure(ok: bool, violation: Violation) -> Result<(), Violation> {
    if ok { Ok(()) } else { Err(violation) }
}

fn within(value: Option<&String>, max_chars: u64) -> bool {
    value.is_none_or(|v| v.validate_length(None, Some(max_chars), None))
}

/// Accepts RFC 3339 timestamps, `YYYY-MM-DDTHH:MM:SS` and plain calendar
/// dates. Values without an offset are read as UTC; a plain date is
/// midnight UTC of that day.
pub fn parse_birth_date(raw: &str) -> Option<DateTime<Utc>> {
    if let Ok(ts) = DateTime::parse_from_rfc3339(raw) {
        return Some(ts.with_timezone(&Utc));
    }
    if let Ok(ts) = NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%.f") {
        return Some(ts.and_utc());
    }
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .ok()
        .and_then(|date| date.and_hms_opt(0, 0, 0))
        .map(|ts| ts.and_utc())
}

fn is_absolute_url(raw: &str) -> bool {
    Url::parse(raw).is_ok_and(|url| url.has_host())
}
