use thiserror::Error;

#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum DecodeError {
    #[error("datagram of {len} bytes is shorter than the 12-byte header")]
    HeaderTruncated { len: usize },
    #[error("header claims {qdcount} questions but none are present")]
    MissingQuestion { qdcount: u16 },
    #[error("label at offset {offset} runs past the end of the datagram")]
    LabelOverrun { offset: usize },
    #[error("label at offset {offset} is {len} bytes, over the 63-byte limit")]
    LabelTooLong { offset: usize, len: usize },
    #[error("question section is truncated after the name at offset {offset}")]
    QuestionTruncated { offset: usize },
    #[error("compression pointer in the question name at offset {offset} is not supported on the decode path")]
    CompressedQuestionUnsupported { offset: usize },
}
