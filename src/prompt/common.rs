// Markers shared by the prompt and the answer extractor. Changing either one
// means changing the few-shot examples and the parser together.
pub const QUERY_MARKER: &str = "### query:";
pub const ANSWER_MARKER: &str = "### information:";

pub const EXTRACTION_INSTRUCTIONS: &str = "You are an expert at extracting useful information from user queries. \
I need you to extract meta information from the user's query.  The extraction results contain 'year', 'month', \
'day', 'file content', 'file type' information for file retriever to locate the file. The extracted information \
should exclusively contain key-value pairs. Additionally, please generate 5 synonyms for the extracted 'file content'. \
Below are 6 examples that meet these requirements:";

pub const QUERY_INTRODUCTION: &str = "Now, please extract meta information from this user query:";
