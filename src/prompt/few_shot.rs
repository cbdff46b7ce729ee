/// A worked example shown to the model before the real query.
#[derive(Debug, Clone, Copy)]
pub struct FewShotExample {
    pub query: &'static str,
    pub information: &'static str,
}

/// The six worked examples. Between them they demonstrate a bounded range,
/// an unknown year (`[-1, -1]`), date-less "general knowledge" queries (`[]`)
/// and a request for the latest files (`[0, 0]`).
pub const FEW_SHOT_EXAMPLES: [FewShotExample; 6] = [
    FewShotExample {
        query: "Project documentation from January 15, 2024, to February 20, 2024",
        information: r#"{'year': [2024, 2024], 'month': [1, 2], 'day': [15, 20], 'file content': ['Project Documentation', 'Project Files', 'Project Overview', 'Project Details', 'Project Progress Documentation'], 'file type': ['pdf', 'doc', 'docx']}"#,
    },
    FewShotExample {
        query: "Find my photos from New York last summer",
        information: r#"{'year': [-1, -1], 'month': [6, 8], 'day': [0, 0], 'file content': ['Photo taken in New York', 'New York Image', 'New York Snapshot', 'New York Picture', 'New York Photograph'], 'file type': ['jpg', 'jpeg', 'png', 'heif', 'tiff']}"#,
    },
    FewShotExample {
        query: "How is AI transforming healthcare diagnostics?",
        information: r#"{'year': [], 'month': [], 'day': [], 'file content': ['AI in Healthcare Diagnostics', 'Artificial Intelligence and Medical Imaging', 'Machine Learning for Early Detection', 'AI Applications in Healthcare', 'Innovations in AI-based Diagnostics'], 'file type': ['pdf', 'docx', 'pptx', 'mp4', 'mp3']}"#,
    },
    FewShotExample {
        query: "Conference materials from the Global Tech Summit held from 2023/10/10 to 2023/10/12",
        information: r#"{'year': [2023, 2023], 'month': [10, 10], 'day': [10, 12], 'file content' : ['Global Tech Summit Materials', 'Tech Summit Presentations', 'Tech Conference Docs', 'Tech Summit Slides', 'Tech Summit Proceedings'], 'file type': ['pdf', 'pptx', 'doc', 'docx']}"#,
    },
    FewShotExample {
        query: "The best ways to introduce coding to children",
        information: r#"{'year': [], 'month': [], 'day': [], 'file content': ['Coding for Kids', 'Children\'s Programming Basics', 'Fun Coding Projects for Kids', 'Learning to Code Through Games', 'Introduction to Programming for Young Learners'], 'file type': ['pdf', 'docx', 'pptx', 'mp4']}"#,
    },
    FewShotExample {
        query: "The latest annual reports of ABC Ltd",
        information: r#"{'year': [0, 0], 'month': [0, 0], 'day': [0, 0], 'file content': ['ABC Ltd. Annual Report', 'Yearly Financial Statement of ABC Ltd.', 'Annual Summary of ABC Ltd.', 'ABC Ltd. Year-End Report', 'ABC Ltd. Fiscal Year Report'], 'file type': ['pdf', 'xlsx', 'xls', 'docx', 'doc']}"#,
    },
];
