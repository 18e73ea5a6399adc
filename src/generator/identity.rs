//! Generator-local identity profiles and fake profile data.
//!
//! Profiles are working data for generation only; they are never stored as
//! entities. What persists are the UserDataAdd messages derived from them.
use crate::core::types::{Fid, Message, UserDataType};
use crate::generator::build_user_data;
use rand::Rng;

const ADJECTIVES: &[&str] = &[
    "purple", "quiet", "rapid", "golden", "lucky", "stellar", "mellow", "brisk", "vivid", "wry",
    "amber", "crisp", "dusty", "eager", "foggy", "keen",
];

const NOUNS: &[&str] = &[
    "otter", "falcon", "badger", "comet", "willow", "ember", "harbor", "lantern", "meadow",
    "summit", "ripple", "cinder", "orchid", "quartz", "thicket", "voyage",
];

const BIOS: &[&str] = &[
    "building in public",
    "casts are my own",
    "probably outside",
    "protocol enjoyer",
    "here for the threads",
    "gm, mostly",
    "shipping and sipping coffee",
    "reply guy in recovery",
];

/// Working profile for one generated identity
#[derive(Debug, Clone)]
pub struct IdentityProfile {
    pub fid: Fid,
    pub display_name: String,
    pub bio: String,
    pub pfp_url: String,
    pub url: String,
    /// Seconds since the Farcaster epoch when the identity joined
    pub join_time: u32,
    /// Activity weight in [0.1, 1.0]; earlier joiners skew more active
    pub activity_weight: f64,
}

impl IdentityProfile {
    /// Create a profile with randomized fake attributes
    pub fn generate<R: Rng>(rng: &mut R, fid: Fid, join_time: u32, activity_weight: f64) -> Self {
        let adjective = ADJECTIVES[rng.random_range(0..ADJECTIVES.len())];
        let noun = NOUNS[rng.random_range(0..NOUNS.len())];
        let display_name = format!("{}-{}-{}", adjective, noun, fid);

        Self {
            fid,
            display_name: display_name.clone(),
            bio: BIOS[rng.random_range(0..BIOS.len())].to_string(),
            pfp_url: format!("https://pfp.hubsim.invalid/{}.png", fid),
            url: format!("https://{}.hubsim.invalid", display_name),
            join_time,
            activity_weight,
        }
    }

    /// The four profile-attribute messages for this identity, timestamped
    /// at its join time
    pub fn user_data_messages(&self) -> Vec<Message> {
        UserDataType::all()
            .map(|data_type| {
                let value = match data_type {
                    UserDataType::DisplayName => self.display_name.clone(),
                    UserDataType::Bio => self.bio.clone(),
                    UserDataType::Pfp => self.pfp_url.clone(),
                    UserDataType::Url => self.url.clone(),
                };
                build_user_data(self.fid, data_type, value, self.join_time)
            })
            .collect()
    }
}
