use std::fmt;

use axum::body::Bytes;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use utoipa::ToSchema;

/// Membership tier of a profile
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum MembershipStatus {
    Free,
    Premium,
}

impl MembershipStatus {
    /// Case-sensitive: only `free` and `premium` are accepted.
    pub fn parse(raw: &str) -> Option<Self> {
        match raw {
            "free" => Some(Self::Free),
            "premium" => Some(Self::Premium),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Free => "free",
            Self::Premium => "premium",
        }
    }
}

impl fmt::Display for MembershipStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// User profile document, keyed by username
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UserProfile {
    #[schema(example = "maverick")]
    pub username: String,
    #[schema(example = "maverick@topgun.example")]
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    #[schema(example = "1986-05-16")]
    pub date_of_birth: String,
    pub address: String,
    #[schema(example = "+14155551234")]
    pub phone_number: String,
    #[schema(example = "https://cdn.example.com/profile-pictures/maverick.png")]
    pub profile_picture_url: String,
    pub bio: String,
    pub flight_experience_level: String,
    pub preferred_aircraft: String,
    pub favorite_destinations: String,
    pub membership_status: MembershipStatus,
    pub date_of_account_creation: String,
    pub last_login_date: String,

    /// Keys the document already carried that this service does not manage
    #[serde(flatten)]
    #[schema(ignore)]
    pub extra: Map<String, Value>,
}

impl UserProfile {
    /// Best-effort read of a stored document that does not match the
    /// current shape. Managed keys holding anything but a string become
    /// empty, an unknown membership tier becomes `free`, and every other
    /// key is carried through untouched.
    pub fn salvage(username: &str, mut document: Map<String, Value>) -> Self {
        document.remove(ProfileField::Username.key());
        let membership_status = MembershipStatus::parse(&take_text(
            &mut document,
            ProfileField::MembershipStatus,
        ))
        .unwrap_or(MembershipStatus::Free);

        Self {
            username: username.to_string(),
            email: take_text(&mut document, ProfileField::Email),
            first_name: take_text(&mut document, ProfileField::FirstName),
            last_name: take_text(&mut document, ProfileField::LastName),
            date_of_birth: take_text(&mut document, ProfileField::DateOfBirth),
            address: take_text(&mut document, ProfileField::Address),
            phone_number: take_text(&mut document, ProfileField::PhoneNumber),
            profile_picture_url: take_text(&mut document, ProfileField::ProfilePictureUrl),
            bio: take_text(&mut document, ProfileField::Bio),
            flight_experience_level: take_text(&mut document, ProfileField::FlightExperienceLevel),
            preferred_aircraft: take_text(&mut document, ProfileField::PreferredAircraft),
            favorite_destinations: take_text(&mut document, ProfileField::FavoriteDestinations),
            membership_status,
            date_of_account_creation: take_text(&mut document, ProfileField::DateOfAccountCreation),
            last_login_date: take_text(&mut document, ProfileField::LastLoginDate),
            extra: document,
        }
    }

    /// Overwrite every mutable field with the validated submission.
    /// The username is the document key and is left untouched.
    pub fn apply(&mut self, update: ProfileUpdate) {
        self.email = update.email;
        self.first_name = update.first_name;
        self.last_name = update.last_name;
        self.date_of_birth = update.date_of_birth;
        self.address = update.address;
        self.phone_number = update.phone_number;
        self.profile_picture_url = update.profile_picture_url;
        self.bio = update.bio;
        self.flight_experience_level = update.flight_experience_level;
        self.preferred_aircraft = update.preferred_aircraft;
        self.favorite_destinations = update.favorite_destinations;
        self.membership_status = update.membership_status;
        self.date_of_account_creation = update.date_of_account_creation;
        self.last_login_date = update.last_login_date;
    }
}

fn take_text(document: &mut Map<String, Value>, field: ProfileField) -> String {
    match document.remove(field.key()) {
        Some(Value::String(text)) => text,
        _ => String::new(),
    }
}

/// Raw profile submission, one optional string per form field
#[derive(Debug, Clone, Default, PartialEq, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ProfileSubmission {
    pub username: Option<String>,
    pub email: Option<String>,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub date_of_birth: Option<String>,
    pub address: Option<String>,
    pub phone_number: Option<String>,
    pub profile_picture_url: Option<String>,
    pub bio: Option<String>,
    pub flight_experience_level: Option<String>,
    pub preferred_aircraft: Option<String>,
    pub favorite_destinations: Option<String>,
    pub membership_status: Option<String>,
    pub date_of_account_creation: Option<String>,
    pub last_login_date: Option<String>,
}

impl ProfileSubmission {
    /// Store a form field by its wire name. Returns false for unknown names.
    pub fn set(&mut self, name: &str, value: String) -> bool {
        match ProfileField::from_key(name) {
            Some(field) => {
                *self.slot_mut(field) = Some(value);
                true
            }
            None => false,
        }
    }

    pub fn get(&self, field: ProfileField) -> Option<&String> {
        match field {
            ProfileField::Username => self.username.as_ref(),
            ProfileField::Email => self.email.as_ref(),
            ProfileField::FirstName => self.first_name.as_ref(),
            ProfileField::LastName => self.last_name.as_ref(),
            ProfileField::DateOfBirth => self.date_of_birth.as_ref(),
            ProfileField::Address => self.address.as_ref(),
            ProfileField::PhoneNumber => self.phone_number.as_ref(),
            ProfileField::ProfilePictureUrl => self.profile_picture_url.as_ref(),
            ProfileField::Bio => self.bio.as_ref(),
            ProfileField::FlightExperienceLevel => self.flight_experience_level.as_ref(),
            ProfileField::PreferredAircraft => self.preferred_aircraft.as_ref(),
            ProfileField::FavoriteDestinations => self.favorite_destinations.as_ref(),
            ProfileField::MembershipStatus => self.membership_status.as_ref(),
            ProfileField::DateOfAccountCreation => self.date_of_account_creation.as_ref(),
            ProfileField::LastLoginDate => self.last_login_date.as_ref(),
        }
    }

    fn slot_mut(&mut self, field: ProfileField) -> &mut Option<String> {
        match field {
            ProfileField::Username => &mut self.username,
            ProfileField::Email => &mut self.email,
            ProfileField::FirstName => &mut self.first_name,
            ProfileField::LastName => &mut self.last_name,
            ProfileField::DateOfBirth => &mut self.date_of_birth,
            ProfileField::Address => &mut self.address,
            ProfileField::PhoneNumber => &mut self.phone_number,
            ProfileField::ProfilePictureUrl => &mut self.profile_picture_url,
            ProfileField::Bio => &mut self.bio,
            ProfileField::FlightExperienceLevel => &mut self.flight_experience_level,
            ProfileField::PreferredAircraft => &mut self.preferred_aircraft,
            ProfileField::FavoriteDestinations => &mut self.favorite_destinations,
            ProfileField::MembershipStatus => &mut self.membership_status,
            ProfileField::DateOfAccountCreation => &mut self.date_of_account_creation,
            ProfileField::LastLoginDate => &mut self.last_login_date,
        }
    }
}

/// The fifteen fields a submission must carry
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ProfileField {
    Username,
    Email,
    FirstName,
    LastName,
    DateOfBirth,
    Address,
    PhoneNumber,
    ProfilePictureUrl,
    Bio,
    FlightExperienceLevel,
    PreferredAircraft,
    FavoriteDestinations,
    MembershipStatus,
    DateOfAccountCreation,
    LastLoginDate,
}

impl ProfileField {
    pub const ALL: [ProfileField; 15] = [
        Self::Username,
        Self::Email,
        Self::FirstName,
        Self::LastName,
        Self::DateOfBirth,
        Self::Address,
        Self::PhoneNumber,
        Self::ProfilePictureUrl,
        Self::Bio,
        Self::FlightExperienceLevel,
        Self::PreferredAircraft,
        Self::FavoriteDestinations,
        Self::MembershipStatus,
        Self::DateOfAccountCreation,
        Self::LastLoginDate,
    ];

    /// Form and document key
    pub fn key(&self) -> &'static str {
        match self {
            Self::Username => "username",
            Self::Email => "email",
            Self::FirstName => "firstName",
            Self::LastName => "lastName",
            Self::DateOfBirth => "dateOfBirth",
            Self::Address => "address",
            Self::PhoneNumber => "phoneNumber",
            Self::ProfilePictureUrl => "profilePictureUrl",
            Self::Bio => "bio",
            Self::FlightExperienceLevel => "flightExperienceLevel",
            Self::PreferredAircraft => "preferredAircraft",
            Self::FavoriteDestinations => "favoriteDestinations",
            Self::MembershipStatus => "membershipStatus",
            Self::DateOfAccountCreation => "dateOfAccountCreation",
            Self::LastLoginDate => "lastLoginDate",
        }
    }

    /// Human-readable name used in error messages
    pub fn label(&self) -> &'static str {
        match self {
            Self::Username => "Username",
            Self::Email => "Email",
            Self::FirstName => "First name",
            Self::LastName => "Last name",
            Self::DateOfBirth => "Date of birth",
            Self::Address => "Address",
            Self::PhoneNumber => "Phone number",
            Self::ProfilePictureUrl => "Profile picture URL",
            Self::Bio => "Bio",
            Self::FlightExperienceLevel => "Flight experience level",
            Self::PreferredAircraft => "Preferred aircraft",
            Self::FavoriteDestinations => "Favorite destinations",
            Self::MembershipStatus => "Membership status",
            Self::DateOfAccountCreation => "Date of account creation",
            Self::LastLoginDate => "Last login date",
        }
    }

    pub fn from_key(key: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|field| field.key() == key)
    }
}

impl fmt::Display for ProfileField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

/// A submission that passed every validation rule
#[derive(Debug, Clone, PartialEq)]
pub struct ProfileUpdate {
    pub username: String,
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    pub date_of_birth: String,
    pub address: String,
    pub phone_number: String,
    pub profile_picture_url: String,
    pub bio: String,
    pub flight_experience_level: String,
    pub preferred_aircraft: String,
    pub favorite_destinations: String,
    pub membership_status: MembershipStatus,
    pub date_of_account_creation: String,
    pub last_login_date: String,
}

impl ProfileUpdate {
    /// Build a fresh document from a validated submission.
    pub fn into_profile(self) -> UserProfile {
        let mut profile = UserProfile {
            username: self.username.clone(),
            email: String::new(),
            first_name: String::new(),
            last_name: String::new(),
            date_of_birth: String::new(),
            address: String::new(),
            phone_number: String::new(),
            profile_picture_url: String::new(),
            bio: String::new(),
            flight_experience_level: String::new(),
            preferred_aircraft: String::new(),
            favorite_destinations: String::new(),
            membership_status: self.membership_status,
            date_of_account_creation: String::new(),
            last_login_date: String::new(),
            extra: Map::new(),
        };
        profile.apply(self);
        profile
    }
}

/// Uploaded profile picture
#[derive(Debug, Clone, PartialEq)]
pub struct Attachment {
    pub bytes: Bytes,
    pub content_type: String,
    pub file_name: Option<String>,
}

/// Profile update confirmation
#[derive(Debug, Serialize, ToSchema)]
pub struct UpdateProfileResponse {
    #[schema(example = "Profile updated successfully.")]
    pub message: String,
}

/// Profile response
#[derive(Debug, Serialize, ToSchema)]
pub struct ProfileResponse {
    pub profile: UserProfile,
}

/// Error body shared by every failing response
#[derive(Debug, Serialize, ToSchema)]
pub struct ErrorResponse {
    #[schema(example = "Invalid email format.")]
    pub error: String,
}
