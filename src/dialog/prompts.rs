//! User-facing text.

use crate::catalog::Facility;
use crate::dialog::state::{FinderPurpose, Shortlisted, UserProfile};
use crate::error::RankError;
use crate::geo::Distance;

pub const WELCOME: &str = "Welcome to the clinic finder bot. You can ask me \"Find me a clinic\" or \"Set my clinic\".";

pub const NOT_UNDERSTOOD: &str = "I do not understand your question, you can try to ask \"Find me a clinic\".";

pub const CANCELLED: &str = "Okay, I've stopped the clinic search.";

pub const GAVE_UP: &str = "Let's try that again later. Ask me \"Find me a clinic\" whenever you're ready.";

pub const NO_CLINICS: &str = "Sorry, I don't have any clinics to suggest right now.";

const LOCATION_FORMAT: &str = "Send it as <longitude>|<latitude>, for example -118.25|34.01.";

/// First prompt of the dialog, asking for the user's location.
pub fn ask_location(profile: &UserProfile, purpose: FinderPurpose) -> String {
    match (&profile.preferred_clinic, purpose) {
        (Some(clinic), FinderPurpose::Find) => format!(
            "Your clinic is {}. I can also suggest clinics near your location. {LOCATION_FORMAT}",
            clinic.name
        ),
        (Some(clinic), FinderPurpose::Set) => format!(
            "Your clinic is currently {}. Tell me your location and I'll suggest clinics near you. {LOCATION_FORMAT}",
            clinic.name
        ),
        (None, _) => format!(
            "You do not have a pre-set clinic, we will suggest clinics near you based on your location. {LOCATION_FORMAT}"
        ),
    }
}

pub fn location_reprompt(err: &RankError) -> String {
    let RankError::InvalidInput(reason) = err;
    format!("I couldn't read that location ({reason}). {LOCATION_FORMAT}")
}

/// Numbered shortlist, nearest first.
pub fn shortlist(candidates: &[Shortlisted]) -> String {
    let mut out = String::from("Here are the clinics closest to you:\n");
    for (idx, c) in candidates.iter().enumerate() {
        out.push_str(&format!(
            "{}. {} ({}) - {}\n   {}\n   {}\n",
            idx + 1,
            c.facility.name,
            c.distance,
            c.facility.specialty,
            c.facility.address,
            c.facility.contact,
        ));
    }
    out.push_str("Reply with the number of the clinic you'd like.");
    out
}

pub fn selection_reprompt(count: usize) -> String {
    format!("Please reply with a number from 1 to {count}.")
}

/// Details of the facility the user picked.
pub fn facility_details(facility: &Facility, distance: &Distance) -> String {
    format!(
        "Here is the information about the selected clinic:\n{}\n{}\n{}, {} County\nPhone: {}\nDistance: {}",
        facility.name,
        facility.specialty,
        facility.address,
        facility.address.county,
        facility.contact,
        distance,
    )
}

pub fn clinic_saved(facility: &Facility) -> String {
    format!("Done. {} is now your clinic.", facility.name)
}

pub fn event_detected(kind: &str) -> String {
    format!("{kind} event detected")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::parse_record;
    use crate::geo::DistanceUnit;

    fn sample() -> Facility {
        parse_record("Stacy Medical Center|BCC|Multi-Specialty|4580 Pacific Blvd|Vernon|Los Angeles|CA|90058|(323) 584-0779|-118.2248393|34.0019771").unwrap()
    }

    #[test]
    fn shortlist_is_numbered() {
        let candidates = vec![Shortlisted {
            facility: sample(),
            distance: Distance {
                value: 1.5439,
                unit: DistanceUnit::Miles,
            },
        }];
        let text = shortlist(&candidates);
        assert!(text.contains("1. Stacy Medical Center (1.54 mi) - Multi-Specialty"));
        assert!(text.contains("4580 Pacific Blvd, Vernon, CA 90058"));
        assert!(text.ends_with("Reply with the number of the clinic you'd like."));
    }

    #[test]
    fn ask_location_mentions_preferred_clinic() {
        let profile = UserProfile {
            preferred_clinic: Some(sample()),
            ..Default::default()
        };
        assert!(ask_location(&profile, FinderPurpose::Find).contains("Stacy Medical Center"));
        assert!(ask_location(&UserProfile::default(), FinderPurpose::Find).starts_with("You do not have a pre-set clinic"));
    }

    #[test]
    fn location_reprompt_includes_reason() {
        let text = location_reprompt(&RankError::InvalidInput("bad".into()));
        assert!(text.contains("(bad)"));
        assert!(text.contains("<longitude>|<latitude>"));
    }
}
