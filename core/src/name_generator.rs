//! Deterministic people and place names for demo data.
//!
//! Same stream position, same name. Lists are append-only so existing
//! seeds keep producing the same files.

use crate::rng::SampleRng;

pub struct NameGenerator;

impl NameGenerator {
    /// "First Last".
    pub fn full_name(rng: &mut SampleRng) -> String {
        let first = Self::first_name(rng);
        let last = Self::last_name(rng);
        format!("{first} {last}")
    }

    pub fn first_name(rng: &mut SampleRng) -> &'static str {
        *rng.pick(FIRST_NAMES)
    }

    pub fn last_name(rng: &mut SampleRng) -> &'static str {
        *rng.pick(LAST_NAMES)
    }

    /// A city used as a transaction location.
    pub fn city(rng: &mut SampleRng) -> &'static str {
        *rng.pick(CITIES)
    }

    /// Four-letter bank code of an IFSC.
    pub fn bank_code(rng: &mut SampleRng) -> &'static str {
        *rng.pick(BANK_CODES)
    }
}

const FIRST_NAMES: &[&str] = &[
    "Aarav", "Aditi", "Akash", "Ananya", "Arjun", "Deepa", "Divya", "Farhan",
    "Gaurav", "Ishita", "Karan", "Kavya", "Meera", "Neha", "Nikhil", "Pooja",
    "Priya", "Rahul", "Rohan", "Sanjay", "Shreya", "Sneha", "Tanvi", "Vikram",
    "Anil", "Sunita", "Ravi", "Lakshmi", "Imran", "Zoya", "Harpreet", "Manoj",
    "Emma", "Liam", "Olivia", "Noah", "Sophia", "James", "Mia", "Daniel",
];

const LAST_NAMES: &[&str] = &[
    "Sharma", "Verma", "Iyer", "Nair", "Reddy", "Gupta", "Patel", "Mehta",
    "Kapoor", "Singh", "Khan", "Das", "Bose", "Menon", "Joshi", "Kulkarni",
    "Chatterjee", "Pillai", "Rao", "Malhotra", "Agarwal", "Banerjee", "Desai",
    "Fernandes", "Smith", "Johnson", "Brown", "Wilson", "Taylor", "Clarke",
];

const CITIES: &[&str] = &[
    "Mumbai", "Delhi", "Bengaluru", "Chennai", "Kolkata", "Hyderabad",
    "Pune", "Ahmedabad", "Jaipur", "Lucknow", "Kochi", "Chandigarh",
];

const BANK_CODES: &[&str] = &[
    "SBIN", "HDFC", "ICIC", "UTIB", "PUNB", "KKBK", "BARB", "CNRB", "IDIB", "YESB",
];

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rng::{RngBank, StreamSlot};

    #[test]
    fn name_generation_is_deterministic() {
        let mut a = RngBank::new(12345).for_slot(StreamSlot::RiskProfiles);
        let mut b = RngBank::new(12345).for_slot(StreamSlot::RiskProfiles);
        for _ in 0..20 {
            assert_eq!(NameGenerator::full_name(&mut a), NameGenerator::full_name(&mut b));
        }
    }

    #[test]
    fn full_names_have_two_parts() {
        let mut rng = RngBank::new(12345).for_slot(StreamSlot::Payroll);
        for _ in 0..100 {
            let name = NameGenerator::full_name(&mut rng);
            let parts: Vec<&str> = name.split_whitespace().collect();
            assert_eq!(parts.len(), 2, "Name should have exactly 2 parts: {name}");
        }
    }
}
