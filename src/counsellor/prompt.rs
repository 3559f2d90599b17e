//! System-prompt assembly. Pure functions over the student's profile,
//! shortlist, and the catalog.

use std::fmt::Write;

use crate::model::{ExamStatus, LinkStatus, Profile, ResolvedLink, SopStatus, University};

/// Weighted readiness score out of 100. Presentation only, never persisted.
pub fn profile_strength(profile: &Profile, shortlisted: usize, locked: usize) -> u32 {
    let mut score = 0;
    score += match profile.ielts_toefl_status {
        ExamStatus::Completed => 25,
        ExamStatus::InProgress => 10,
        ExamStatus::NotStarted => 0,
    };
    score += match profile.gre_gmat_status {
        ExamStatus::Completed => 25,
        ExamStatus::InProgress => 10,
        ExamStatus::NotStarted => 0,
    };
    score += match profile.sop_status {
        SopStatus::Ready => 25,
        SopStatus::Draft => 10,
        SopStatus::NotStarted => 0,
    };
    if profile.gpa.is_some() {
        score += 15;
    }
    if shortlisted >= 3 {
        score += 5;
    }
    if locked >= 1 {
        score += 5;
    }
    score
}

/// Open gaps worth nagging the student about.
fn profile_gaps(profile: &Profile) -> Vec<&'static str> {
    let mut gaps = Vec::new();
    if profile.ielts_toefl_status != ExamStatus::Completed {
        gaps.push("English proficiency test (IELTS/TOEFL)");
    }
    if profile.gre_gmat_status != ExamStatus::Completed {
        gaps.push("GRE/GMAT exam");
    }
    if profile.sop_status != SopStatus::Ready {
        gaps.push("Statement of Purpose");
    }
    if profile.gpa.is_none() {
        gaps.push("GPA/grades not specified");
    }
    gaps
}

fn exam_impact(status: ExamStatus) -> &'static str {
    match status {
        ExamStatus::Completed => "✅ +25%",
        ExamStatus::InProgress => "⏳",
        ExamStatus::NotStarted => "❌ 0%",
    }
}

fn sop_impact(status: SopStatus) -> &'static str {
    match status {
        SopStatus::Ready => "✅ +25%",
        SopStatus::Draft => "⏳",
        SopStatus::NotStarted => "❌ 0%",
    }
}

/// Dollar amount with thousands separators, e.g. 40000 -> "40,000".
fn group_thousands(n: i64) -> String {
    let digits = n.unsigned_abs().to_string();
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }
    if n < 0 {
        grouped.insert(0, '-');
    }
    grouped
}

/// Build the full system prompt: profile snapshot, readiness table, stage,
/// current shortlist/locks, a catalog excerpt, and the action vocabulary
/// with the exact output format the parser expects.
pub fn build_system_prompt(
    profile: &Profile,
    links: &[ResolvedLink],
    catalog: &[University],
) -> String {
    let shortlisted: Vec<&ResolvedLink> = links
        .iter()
        .filter(|l| l.link.status == LinkStatus::Shortlisted)
        .collect();
    let locked: Vec<&ResolvedLink> = links
        .iter()
        .filter(|l| l.link.status == LinkStatus::Locked)
        .collect();

    let strength = profile_strength(profile, shortlisted.len(), locked.len());
    let gaps = profile_gaps(profile);

    let countries = if profile.preferred_countries.is_empty() {
        "Not specified".to_string()
    } else {
        profile.preferred_countries.join(", ")
    };
    let gpa_line = match profile.gpa {
        Some(gpa) => format!("{gpa} ✓"),
        None => "Not provided ⚠️ Missing".to_string(),
    };

    let mut prompt = format!(
        "You are an elite AI Study Abroad Counsellor. You don't just give advice—you TAKE ACTIONS.\n\
         \n\
         ## Your Core Responsibility\n\
         Help this student succeed in their study abroad journey by:\n\
         1. Analyzing their profile strengths and gaps\n\
         2. Recommending specific universities with clear reasoning\n\
         3. EXECUTING actions directly (shortlist, lock, create tasks)\n\
         4. Guiding them step-by-step through each stage\n\
         \n\
         ## Student Profile (Profile Strength: {strength}%)\n\
         - **Education**: {education} in {major}\n\
         - **Graduation Year**: {grad_year}\n\
         - **GPA**: {gpa_line}\n\
         - **Target Degree**: {degree} in {field}\n\
         - **Target Intake**: {intake}\n\
         - **Preferred Countries**: {countries}\n\
         - **Budget**: ${budget}/year\n\
         - **Funding**: {funding}\n\
         \n\
         ## Exam & Document Status\n\
         | Item | Status | Score Impact |\n\
         |------|--------|--------------|\n\
         | IELTS/TOEFL | {ielts} | {ielts_impact} |\n\
         | GRE/GMAT | {gre} | {gre_impact} |\n\
         | SOP | {sop} | {sop_impact} |\n\
         \n\
         ## Profile Gaps to Address\n",
        strength = strength,
        education = profile.current_education_level,
        major = profile.degree_major,
        grad_year = profile.graduation_year,
        gpa_line = gpa_line,
        degree = profile.intended_degree.to_uppercase(),
        field = profile.field_of_study,
        intake = profile.target_intake_year,
        countries = countries,
        budget = group_thousands(profile.budget_per_year),
        funding = profile.funding_plan,
        ielts = profile.ielts_toefl_status.as_str(),
        ielts_impact = exam_impact(profile.ielts_toefl_status),
        gre = profile.gre_gmat_status.as_str(),
        gre_impact = exam_impact(profile.gre_gmat_status),
        sop = profile.sop_status.as_str(),
        sop_impact = sop_impact(profile.sop_status),
    );

    if gaps.is_empty() {
        prompt.push_str("- None! Profile looks complete.\n");
    } else {
        for gap in &gaps {
            let _ = writeln!(prompt, "- {gap}");
        }
    }

    let _ = writeln!(prompt, "\n## Current Stage: **{}**", profile.current_stage.title());

    if shortlisted.is_empty() {
        prompt.push_str("\n## Shortlisted Universities\n- None yet. Help the student shortlist!\n");
    } else {
        let _ = writeln!(prompt, "\n## Shortlisted Universities ({})", shortlisted.len());
        for l in &shortlisted {
            let _ = writeln!(
                prompt,
                "- **{}** ({}) — ID: {}, Category: {}",
                l.university.name,
                l.university.country,
                l.link.university_id,
                l.link.category.as_str().to_uppercase()
            );
        }
    }

    if !locked.is_empty() {
        let _ = writeln!(
            prompt,
            "\n## Locked Universities ({}) ✅ — Use these IDs when creating tasks!",
            locked.len()
        );
        for l in &locked {
            let _ = writeln!(
                prompt,
                "- **{}** ({}) — ID: {}, COMMITTED",
                l.university.name, l.university.country, l.link.university_id
            );
        }
    }

    if !catalog.is_empty() {
        let _ = writeln!(
            prompt,
            "\n## Available Universities for Recommendation ({} in database)",
            catalog.len()
        );
        for uni in catalog.iter().take(10) {
            let _ = writeln!(
                prompt,
                "- ID {}: **{}** ({}) — ${}/yr, {}",
                uni.id,
                uni.name,
                uni.country,
                group_thousands(uni.tuition_per_year),
                uni.field_of_study
            );
        }
        if catalog.len() > 10 {
            let _ = writeln!(prompt, "... and {} more.", catalog.len() - 10);
        }
    }

    prompt.push_str(
        "\n\
         ## YOUR SUPERPOWERS (Use Them!)\n\
         \n\
         You can EXECUTE these actions directly. The system will perform them automatically:\n\
         \n\
         | Action | What It Does | When To Use |\n\
         |--------|--------------|-------------|\n\
         | `shortlist_university` | Adds a university to student's shortlist | When recommending Dream/Target/Safe schools |\n\
         | `lock_university` | Commits student to a university | When student is ready to focus on applications |\n\
         | `create_todo` | Creates a task in student's to-do list | For actionable next steps |\n\
         | `recommend_university` | Shows a university card with full details | When explaining why a school fits |\n\
         \n\
         ## Action Format (CRITICAL!)\n\
         Include actions at the END of your response in this EXACT format:\n\
         ```actions\n\
         [\n\
           {\"type\": \"shortlist_university\", \"payload\": {\"university_id\": 1, \"category\": \"dream\", \"reason\": \"Top CS program within budget\"}},\n\
           {\"type\": \"lock_university\", \"payload\": {\"university_id\": 1, \"reason\": \"Best fit for your goals\"}},\n\
           {\"type\": \"create_todo\", \"payload\": {\"title\": \"Schedule IELTS exam\", \"description\": \"Book at least 8 weeks before application deadline\", \"university_id\": 1}},\n\
           {\"type\": \"recommend_university\", \"payload\": {\"university_id\": 2, \"category\": \"target\", \"fit_reason\": \"Matches your budget and field\", \"risk\": \"Competitive admissions\"}}\n\
         ]\n\
         ```\n\
         \n\
         **IMPORTANT for create_todo**: When creating tasks for a LOCKED university, ALWAYS include \"university_id\" with the university's ID. This links the task to that specific university. Only omit university_id for general tasks not specific to any university.\n\
         \n\
         ## Response Style\n\
         1. **Be proactive** — Don't just answer, take action\n\
         2. **Be specific** — Reference exact universities by name and ID\n\
         3. **Explain reasoning** — Why is this school Dream/Target/Safe for THIS student?\n\
         4. **Create urgency** — What should they do RIGHT NOW?\n\
         5. **Celebrate progress** — Acknowledge what they've accomplished\n\
         \n\
         ## Stage-Specific Guidance\n\
         - **Building Profile**: Focus on exam prep, SOP drafting, completing profile\n\
         - **Discovering Universities**: Actively shortlist 3-5 schools (mix of Dream/Target/Safe)\n\
         - **Finalizing Universities**: Push for locking decisions, compare options\n\
         - **Preparing Applications**: Create document checklists, deadline tasks, SOP review\n",
    );

    prompt
}
