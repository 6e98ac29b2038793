//! Output schemas for the guidance operations.

use llm::Schema;

/// A list of career paths.
pub fn careers() -> Schema {
    let milestone = Schema::object([
        ("id", Schema::string()),
        ("age", Schema::number()),
        ("label", Schema::string()),
        ("description", Schema::string()),
        ("type", Schema::string()),
    ])
    .required(["id", "age", "label", "description", "type"]);

    let outlook = Schema::object([
        ("entrySalary", Schema::string()),
        ("midSalary", Schema::string()),
        ("seniorSalary", Schema::string()),
        ("demand", Schema::string()),
        ("stability", Schema::number()),
        ("growth", Schema::number()),
    ])
    .required([
        "entrySalary",
        "midSalary",
        "seniorSalary",
        "demand",
        "stability",
        "growth",
    ]);

    let resource = Schema::object([
        ("id", Schema::string()),
        ("title", Schema::string()),
        ("type", Schema::string()),
        ("difficulty", Schema::string()),
        ("timeCommitment", Schema::string()),
        ("whyItMatters", Schema::string()),
    ])
    .required([
        "id",
        "title",
        "type",
        "difficulty",
        "timeCommitment",
        "whyItMatters",
    ]);

    let career = Schema::object([
        ("id", Schema::string()),
        ("title", Schema::string()),
        ("reason", Schema::string()),
        ("confidence", Schema::number()),
        ("lifestyle", Schema::string()),
        ("timeline", Schema::array(milestone)),
        ("outlook", outlook),
        ("resources", Schema::array(resource)),
    ])
    .required([
        "id",
        "title",
        "reason",
        "confidence",
        "lifestyle",
        "timeline",
        "outlook",
        "resources",
    ]);

    Schema::array(career)
}

/// Chapters of a life-story preview.
pub fn life_story() -> Schema {
    Schema::array(
        Schema::object([
            ("title", Schema::string()),
            ("text", Schema::string()),
            ("imagePrompt", Schema::string()),
        ])
        .required(["title", "text", "imagePrompt"]),
    )
}

/// Example answers to an onboarding question.
pub fn suggestions() -> Schema {
    Schema::array(Schema::string())
}

/// Academic record analysis.
pub fn academic_analysis() -> Schema {
    let course = Schema::object([
        ("name", Schema::string()),
        ("why", Schema::string()),
        ("relevance", Schema::number()),
    ])
    .required(["name", "why", "relevance"]);

    let program = Schema::object([
        ("program", Schema::string()),
        ("universities", Schema::array(Schema::string())),
        ("description", Schema::string()),
    ])
    .required(["program", "universities", "description"]);

    Schema::object([
        ("keyCourses", Schema::array(course)),
        ("masterPrograms", Schema::array(program)),
        ("gpaInsight", Schema::string()),
    ])
    .required(["keyCourses", "masterPrograms", "gpaInsight"])
}
