use serde::{Deserialize, Serialize};

/// ========================================
/// HTTP request/response payload types
/// ========================================

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: String,
    pub content: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ChatRequest {
    pub messages: Vec<ChatMessage>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ChatResponse {
    pub reply: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SuggestionRequest {
    pub subject: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SuggestionResponse {
    #[serde(default)]
    pub adjectives: Vec<String>,
    #[serde(default)]
    pub verbs: Vec<String>,
    #[serde(default)]
    pub locations: Vec<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AdjectiveRequest {
    pub object_name: String,
    pub image_data: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AdjectiveResponse {
    #[serde(default)]
    pub adjectives: Vec<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct MoodStyleRequest {
    pub prompt: String,
    pub image_data: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MoodStyleResponse {
    #[serde(default)]
    pub moods: Vec<String>,
    #[serde(default)]
    pub styles: Vec<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ImageGenerationRequest {
    pub prompt: String,
    /// Data URL of the child's drawing, or the literal "none".
    pub user_image: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct ImageGenerationResponse {
    pub image_url: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct HintRequest {
    pub prompt: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HintResponse {
    #[serde(default)]
    pub adjectives: Vec<String>,
    #[serde(default)]
    pub verbs: Vec<String>,
    #[serde(default)]
    pub styles: Vec<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ShareRequest {
    pub prompt: String,
    pub image_url: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PostRead {
    pub id: i64,
    pub prompt: String,
    pub image_url: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SaveImageRequest {
    pub temp_url: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct SaveImageResponse {
    pub saved_url: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LayerKind {
    Text,
    Image,
}

/// One user-supplied content unit contributing to a composed prompt.
/// Order is significant: it is preserved into the model call.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Layer {
    pub name: String,
    #[serde(rename = "type")]
    pub kind: LayerKind,
    pub data: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ComposePromptRequest {
    pub layers: Vec<Layer>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ComposePromptResponse {
    #[serde(default)]
    pub dalle_prompt: String,
    #[serde(default)]
    pub korean_description: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct MerchMockupRequest {
    pub design_url: String,
    pub product: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct MerchMockupResponse {
    pub image_url: String,
    pub prompt_used: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct EmojiQuizRequest {
    #[serde(default)]
    pub topic: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QuizQuestion {
    #[serde(default)]
    pub emojis: String,
    #[serde(default)]
    pub options: Vec<String>,
    #[serde(rename = "correctIndex", default)]
    pub correct_index: usize,
    #[serde(default)]
    pub explanation: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EmojiQuizResponse {
    #[serde(default)]
    pub questions: Vec<QuizQuestion>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct PromptPuzzleRequest {
    pub level_count: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BlockKind {
    Subject,
    Action,
    Location,
}

/// A candidate phrase tagged with its grammatical role in the puzzle game.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PuzzleBlock {
    #[serde(default)]
    pub text: String,
    #[serde(rename = "type")]
    pub kind: BlockKind,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PuzzleLevel {
    #[serde(default)]
    pub theme: String,
    #[serde(default)]
    pub prompt_kr: String,
    #[serde(rename = "availableBlocks", default)]
    pub available_blocks: Vec<PuzzleBlock>,
    #[serde(rename = "correctBlocks", default)]
    pub correct_blocks: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PromptPuzzleResponse {
    #[serde(default)]
    pub levels: Vec<PuzzleLevel>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct PuzzleImageRequest {
    pub prompt_kr: String,
    pub subject: String,
    pub action: String,
    pub location: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct PuzzleImageResponse {
    pub image_url: String,
    pub prompt_used: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub prompt_used_kr: Option<String>,
}
