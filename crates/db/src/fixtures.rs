//! Built-in sample directory used by `ambel seed` and by tests.

use ambel_core::{Availability, ProfessionalRecord};

struct SampleProfessional {
    name: &'static str,
    professional_type: &'static str,
    specialty: &'static str,
    location: &'static str,
    description: &'static str,
    availability: &'static [(&'static str, &'static [&'static str])],
}

const SAMPLE_PROFESSIONALS: &[SampleProfessional] = &[
    SampleProfessional {
        name: "Dr. Anika Rahman",
        professional_type: "doctor",
        specialty: "cardiologist",
        location: "chattogram",
        description: "A highly experienced cardiologist specializing in heart failure and preventative care for adults.",
        availability: &[
            ("Monday", &["10:00 AM", "2:00 PM", "4:00 PM"]),
            ("Wednesday", &["9:00 AM", "11:00 AM"]),
        ],
    },
    SampleProfessional {
        name: "Dr. Farhan Ahmed",
        professional_type: "doctor",
        specialty: "dermatologist",
        location: "dhaka",
        description: "Expert in skin care, acne treatment, and cosmetic dermatology.",
        availability: &[
            ("Tuesday", &["11:00 AM", "3:00 PM"]),
            ("Thursday", &["10:00 AM", "1:00 PM", "4:00 PM"]),
        ],
    },
    SampleProfessional {
        name: "Barrister Sameera Khan",
        professional_type: "lawyer",
        specialty: "corporate law",
        location: "chattogram",
        description: "Specializes in business contracts, mergers, and acquisitions for tech startups.",
        availability: &[
            ("Monday", &["9:00 AM", "1:00 PM"]),
            ("Tuesday", &["2:00 PM", "5:00 PM"]),
            ("Friday", &["10:00 AM"]),
        ],
    },
];

pub struct SampleDirectory;

impl SampleDirectory {
    /// Sample records without embeddings. Type, specialty and location are lowercase.
    pub fn records() -> Vec<ProfessionalRecord> {
        SAMPLE_PROFESSIONALS
            .iter()
            .map(|sample| ProfessionalRecord {
                name: sample.name.to_string(),
                professional_type: sample.professional_type.to_string(),
                specialty: sample.specialty.to_string(),
                location: sample.location.to_string(),
                description: sample.description.to_string(),
                embedding: Vec::new(),
                availability: sample
                    .availability
                    .iter()
                    .map(|(day, slots)| Availability {
                        day: (*day).to_string(),
                        slots: slots.iter().map(|slot| (*slot).to_string()).collect(),
                    })
                    .collect(),
            })
            .collect()
    }
}
