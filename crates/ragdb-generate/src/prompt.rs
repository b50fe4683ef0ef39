//! The fixed prompt template: instruction header, retrieved context, the
//! user's question, then the answer cue the model completes after.

pub fn build_prompt(context: &str, question: &str) -> String {
    format!(
        "### Instruction:\n\
         You are a helpful AI assistant. Your task is to answer questions based on the provided context.\n\
         \n\
         Please provide your response in the following format:\n\
         Answer: <your answer here>\n\
         \n\
         ### Context:\n\
         {context}\n\
         \n\
         ### Question:\n\
         {question}\n\
         \n\
         ### Answer:\n"
    )
}
