//! Default university catalog, inserted once when the table is empty.

use crate::model::{AcceptanceChance, NewUniversity, RiskLevel};

fn entry(
    name: &str,
    country: &str,
    city: &str,
    field_of_study: &str,
    degree_level: &str,
    tuition_per_year: i64,
    cost_level: RiskLevel,
    competition_level: RiskLevel,
    base_acceptance_chance: AcceptanceChance,
    description: &str,
) -> NewUniversity {
    NewUniversity {
        name: name.to_string(),
        country: country.to_string(),
        city: Some(city.to_string()),
        field_of_study: field_of_study.to_string(),
        degree_level: degree_level.to_string(),
        tuition_per_year,
        cost_level,
        competition_level,
        base_acceptance_chance,
        description: Some(description.to_string()),
    }
}

/// The built-in catalog. Order matters: rowids are assigned in sequence, so
/// the first entry is always id 1 on a fresh database.
pub fn default_catalog() -> Vec<NewUniversity> {
    use AcceptanceChance as Chance;
    use RiskLevel::{High, Low, Medium};

    vec![
        // USA
        entry("Massachusetts Institute of Technology", "USA", "Cambridge", "Computer Science", "masters", 58_000, High, High, Chance::Low, "World-renowned for engineering and technology programs."),
        entry("Stanford University", "USA", "Stanford", "Computer Science", "masters", 56_000, High, High, Chance::Low, "Silicon Valley's top university with strong industry connections."),
        entry("Carnegie Mellon University", "USA", "Pittsburgh", "Computer Science", "masters", 52_000, High, High, Chance::Low, "Top-ranked CS program with focus on AI and robotics."),
        entry("University of California Berkeley", "USA", "Berkeley", "Computer Science", "masters", 45_000, High, High, Chance::Low, "Leading public university with excellent research opportunities."),
        entry("Georgia Institute of Technology", "USA", "Atlanta", "Computer Science", "masters", 32_000, Medium, Medium, Chance::Medium, "Top engineering school with affordable tuition."),
        entry("University of Texas at Austin", "USA", "Austin", "Computer Science", "masters", 28_000, Medium, Medium, Chance::Medium, "Growing tech hub with strong industry partnerships."),
        entry("Arizona State University", "USA", "Tempe", "Computer Science", "masters", 22_000, Low, Low, Chance::High, "Innovation-focused university with flexible programs."),
        // UK
        entry("University of Oxford", "UK", "Oxford", "Computer Science", "masters", 42_000, High, High, Chance::Low, "World's oldest English-speaking university with cutting-edge research."),
        entry("University of Cambridge", "UK", "Cambridge", "Computer Science", "masters", 40_000, High, High, Chance::Low, "Historic excellence in science and technology."),
        entry("Imperial College London", "UK", "London", "Computer Science", "masters", 38_000, High, High, Chance::Low, "STEM-focused institution in the heart of London."),
        entry("University College London", "UK", "London", "Computer Science", "masters", 35_000, Medium, Medium, Chance::Medium, "Research-intensive university with diverse programs."),
        entry("University of Edinburgh", "UK", "Edinburgh", "Computer Science", "masters", 30_000, Medium, Medium, Chance::Medium, "Top Scottish university with strong AI research."),
        entry("University of Manchester", "UK", "Manchester", "Computer Science", "masters", 28_000, Medium, Low, Chance::High, "Birthplace of modern computing with excellent facilities."),
        // Canada
        entry("University of Toronto", "Canada", "Toronto", "Computer Science", "masters", 35_000, Medium, High, Chance::Medium, "Canada's top university with world-class AI research."),
        entry("University of British Columbia", "Canada", "Vancouver", "Computer Science", "masters", 32_000, Medium, Medium, Chance::Medium, "Beautiful campus with strong tech industry connections."),
        entry("McGill University", "Canada", "Montreal", "Computer Science", "masters", 25_000, Medium, Medium, Chance::Medium, "Research powerhouse in bilingual Montreal."),
        entry("University of Waterloo", "Canada", "Waterloo", "Computer Science", "masters", 28_000, Medium, Medium, Chance::Medium, "Famous for co-op programs and startup culture."),
        // Germany
        entry("Technical University of Munich", "Germany", "Munich", "Computer Science", "masters", 3_000, Low, High, Chance::Medium, "Top German technical university with minimal tuition."),
        entry("RWTH Aachen University", "Germany", "Aachen", "Computer Science", "masters", 2_500, Low, Medium, Chance::Medium, "Excellent engineering programs at low cost."),
        entry("Technical University of Berlin", "Germany", "Berlin", "Computer Science", "masters", 2_000, Low, Medium, Chance::High, "Great programs in vibrant Berlin."),
        entry("Ludwig Maximilian University", "Germany", "Munich", "Data Science", "masters", 2_500, Low, Medium, Chance::Medium, "Strong research university in beautiful Bavaria."),
        // Australia
        entry("University of Melbourne", "Australia", "Melbourne", "Computer Science", "masters", 42_000, High, Medium, Chance::Medium, "Australia's top-ranked university."),
        entry("University of Sydney", "Australia", "Sydney", "Computer Science", "masters", 40_000, High, Medium, Chance::Medium, "Prestigious university in iconic Sydney."),
        entry("Australian National University", "Australia", "Canberra", "Computer Science", "masters", 38_000, High, Medium, Chance::Medium, "Research-intensive in the capital city."),
        entry("UNSW Sydney", "Australia", "Sydney", "Computer Science", "masters", 36_000, Medium, Low, Chance::High, "Strong industry partnerships and employability focus."),
        // Netherlands
        entry("TU Delft", "Netherlands", "Delft", "Computer Science", "masters", 18_000, Medium, Medium, Chance::Medium, "Top Dutch technical university."),
        entry("University of Amsterdam", "Netherlands", "Amsterdam", "Artificial Intelligence", "masters", 15_000, Medium, Medium, Chance::Medium, "Excellent AI program in exciting Amsterdam."),
        entry("Eindhoven University of Technology", "Netherlands", "Eindhoven", "Computer Science", "masters", 16_000, Medium, Low, Chance::High, "Strong tech focus with industry collaborations."),
        // Singapore
        entry("National University of Singapore", "Singapore", "Singapore", "Computer Science", "masters", 35_000, Medium, High, Chance::Medium, "Asia's top university with global recognition."),
        entry("Nanyang Technological University", "Singapore", "Singapore", "Computer Science", "masters", 32_000, Medium, Medium, Chance::Medium, "Young university with rapid rise in rankings."),
        // Ireland
        entry("Trinity College Dublin", "Ireland", "Dublin", "Computer Science", "masters", 25_000, Medium, Medium, Chance::Medium, "Ireland's oldest university in tech hub Dublin."),
        entry("University College Dublin", "Ireland", "Dublin", "Computer Science", "masters", 22_000, Medium, Low, Chance::High, "Large research university with global outlook."),
        // France
        entry("École Polytechnique", "France", "Paris", "Computer Science", "masters", 15_000, Medium, High, Chance::Low, "France's most prestigious engineering school."),
        entry("Sorbonne University", "France", "Paris", "Computer Science", "masters", 5_000, Low, Medium, Chance::Medium, "Historic university with affordable tuition."),
        // MBA
        entry("Harvard Business School", "USA", "Boston", "Business Administration", "mba", 75_000, High, High, Chance::Low, "World's most prestigious MBA program."),
        entry("INSEAD", "France", "Fontainebleau", "Business Administration", "mba", 95_000, High, High, Chance::Low, "One-year accelerated MBA with global campuses."),
        entry("London Business School", "UK", "London", "Business Administration", "mba", 70_000, High, High, Chance::Medium, "Top European MBA in global financial center."),
    ]
}
