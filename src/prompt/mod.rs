use crate::errors::ApiError;
use crate::provider::{ChatCall, ContentPart};
use crate::schema;
use crate::wire::{ChatMessage, Layer, LayerKind};

/// ========================================
/// Prompt builders, one per feature
/// ========================================
///
/// Each builder turns a typed request into a fixed system instruction plus an
/// ordered user-content sequence. Builders that vary only a single free-text
/// field keep the instruction constant and substitute exactly one
/// interpolation point; that field is untrusted user text, never re-parsed as
/// instructions.

/// Opening phrase of every generated children's illustration prompt.
pub const ILLUSTRATION_ANCHOR: &str = "A simple, clean, cute children's book illustration of";

const CHAT_PERSONA: &str = "너는 AI와 프롬프트에 대해 아이들에게 가르쳐주는 친절하고 상냥한 AI 조수야. \
아이들이 이해하기 쉽도록 항상 짧고 재미있게 대답해줘.";

pub fn chat_call(messages: &[ChatMessage]) -> Result<ChatCall, ApiError> {
    if messages.is_empty() {
        return Err(ApiError::BadRequest("messages must not be empty".into()));
    }
    Ok(ChatCall {
        system: CHAT_PERSONA.into(),
        history: messages.to_vec(),
        ..Default::default()
    })
}

pub fn keyword_call(subject: &str) -> Result<ChatCall, ApiError> {
    if subject.trim().is_empty() {
        return Err(ApiError::BadRequest("subject must not be empty".into()));
    }
    let system = format!(
        "당신은 어린이 그림 그리기 게임을 돕는 창의적인 AI 어시스턴트입니다. \
사용자가 그리고 싶은 주인공으로 '{subject}'를(을) 선택했습니다. \
당신의 임무는 주인공 '{subject}'와(과) 잘 어울리는 이야기를 만들 수 있는 연관 키워드를 추천하는 것입니다. \
'꾸며주는 말(형용사)' 8개, '하는 일(동사)' 8개, '장소' 8개를 각각 추천해주세요. \
모든 키워드는 한국어여야 하며 어린이에게 적합해야 합니다. {contract}",
        contract = schema::KEYWORDS.clause(),
    );
    Ok(ChatCall {
        system,
        parts: vec![ContentPart::Text(format!(
            "Please generate keywords for the subject: '{subject}'"
        ))],
        json_mode: true,
        ..Default::default()
    })
}

pub fn adjective_call(object_name: &str, image_data: &str) -> Result<ChatCall, ApiError> {
    if object_name.trim().is_empty() || image_data.trim().is_empty() {
        return Err(ApiError::BadRequest(
            "object_name and image_data are required".into(),
        ));
    }
    let system = format!(
        "You are a creative assistant for a children's drawing game. The user drew an object \
and tells you what it is. Look at the drawing and suggest child-friendly Korean descriptive \
words that match both the drawing and the object. {contract}",
        contract = schema::ADJECTIVES.clause(),
    );
    Ok(ChatCall {
        system,
        parts: vec![
            ContentPart::Text(format!("The child says the drawing shows: '{object_name}'")),
            ContentPart::ImageUrl(image_data.to_string()),
        ],
        json_mode: true,
        ..Default::default()
    })
}

pub fn mood_style_call(prompt: &str, image_data: &str) -> Result<ChatCall, ApiError> {
    if image_data.trim().is_empty() {
        return Err(ApiError::BadRequest("image_data is required".into()));
    }
    let system = format!(
        "You are a creative assistant for a children's drawing game. The user shows you a \
drawing and the sentence they wrote about it. Suggest Korean mood words and art style names \
that would suit this picture, all age-appropriate. {contract}",
        contract = schema::MOOD_STYLE.clause(),
    );
    Ok(ChatCall {
        system,
        parts: vec![
            ContentPart::Text(format!("User's sentence about the drawing: '{prompt}'")),
            ContentPart::ImageUrl(image_data.to_string()),
        ],
        json_mode: true,
        ..Default::default()
    })
}

pub fn hint_call(prompt: &str) -> Result<ChatCall, ApiError> {
    if prompt.trim().is_empty() {
        return Err(ApiError::BadRequest("prompt must not be empty".into()));
    }
    let system = format!(
        r#"You are an AI assistant that helps a child learn prompt engineering. The user will provide a sentence they have created. Your task is to analyze this sentence and suggest alternative or additional keywords to inspire creativity.
CRITICAL INSTRUCTIONS:
1. The keywords must be in Korean.
2. The keywords should be creative and related to the user's prompt, but do not need to be strictly derived from it. Expand on the theme.
3. {contract}
Example user prompt: "숲속에서 잠자는 커다란 빨간 용"
Example response: {{ "adjectives": ["신비로운", "고대의", "반짝이는", "거대한", "평화로운"], "verbs": ["꿈을 꾸는", "숨 쉬는", "둥지를 튼", "조용히 기다리는", "빛을 내는"], "styles": ["수채화 스타일", "애니메이션 느낌", "밤 배경", "아침 햇살 아래", "판타지 아트"] }}"#,
        contract = schema::HINTS.clause(),
    );
    Ok(ChatCall {
        system,
        parts: vec![ContentPart::Text(prompt.to_string())],
        json_mode: true,
        ..Default::default()
    })
}

/// Multi-layer composition: interleave text blocks and image anchors in the
/// caller-supplied order. Zero usable layers is a client error, not an
/// upstream call.
pub fn compose_call(layers: &[Layer]) -> Result<ChatCall, ApiError> {
    let mut parts = Vec::new();
    for layer in layers {
        if layer.data.is_empty() {
            continue;
        }
        match layer.kind {
            LayerKind::Text => {
                parts.push(ContentPart::Text(format!(
                    "Layer '{name}': {data}",
                    name = layer.name,
                    data = layer.data
                )));
            }
            LayerKind::Image => {
                parts.push(ContentPart::Text(format!(
                    "Layer '{name}' (analyze image):",
                    name = layer.name
                )));
                parts.push(ContentPart::ImageUrl(layer.data.clone()));
            }
        }
    }
    if parts.is_empty() {
        return Err(ApiError::BadRequest("No content provided.".into()));
    }
    let system = format!(
        "You are a master prompt crafter for DALL-E 3. Your task is to analyze multiple layers \
of user input (images and text) and generate two versions of a final prompt: a detailed \
English prompt for DALL-E 3 and a natural Korean sentence describing the final image for \
the user. {contract}",
        contract = schema::COMPOSE.clause(),
    );
    Ok(ChatCall {
        system,
        parts,
        json_mode: true,
        max_tokens: Some(400),
        ..Default::default()
    })
}

/// The vision step of image generation: craft a DALL-E prompt that respects
/// the child's drawing. Output is the prompt text itself, not JSON.
pub fn vision_refine_call(prompt: &str, user_image: &str) -> ChatCall {
    let system = format!(
        r#"You are an expert prompt engineer for a children's educational drawing AI. Your task is to create a final English prompt for DALL-E 3 by combining a user's (1) simple drawing and (2) text description.
CRITICAL RULES:
1. Strictly Adhere to the Drawing: respect the user's original drawing. Maintain the composition, pose, and basic shapes.
2. Explicit Text Only: only add or modify elements explicitly mentioned in the text.
3. No Assumptions: DO NOT add faces, eyes, or limbs unless drawn or described. Do not guess mood.
4. White Background is Default: if no background is specified, use "isolated on a plain white background".
5. Consistent Style: always start with "{ILLUSTRATION_ANCHOR}...".
6. Output Format: respond ONLY with the final English prompt."#
    );
    ChatCall {
        system,
        parts: vec![
            ContentPart::Text(format!("User's Text Prompt: '{prompt}'")),
            ContentPart::ImageUrl(user_image.to_string()),
        ],
        max_tokens: Some(150),
        ..Default::default()
    }
}

/// Template used when there is no drawing, and as the fallback when the
/// vision step fails.
pub fn plain_image_prompt(prompt: &str) -> String {
    format!("A simple, clean, cute children's book illustration style of: {prompt}")
}

pub fn merch_describe_call(design_url: &str, product: &str) -> Result<ChatCall, ApiError> {
    if design_url.trim().is_empty() || product.trim().is_empty() {
        return Err(ApiError::BadRequest("design_url and product are required".into()));
    }
    let system = "You are a product designer for children's merchandise. Look at the design \
image and describe it in one short English sentence: the main subject, its colors and its \
overall style. Respond ONLY with that sentence."
        .to_string();
    Ok(ChatCall {
        system,
        parts: vec![
            ContentPart::Text(format!("The design will be printed on a {product}.")),
            ContentPart::ImageUrl(design_url.to_string()),
        ],
        max_tokens: Some(100),
        ..Default::default()
    })
}

pub fn merch_image_prompt(description: &str, product: &str) -> String {
    format!(
        "A clean studio product photo of a {product} featuring this printed design: \
{description}. Neutral background, soft lighting, the design clearly visible."
    )
}

pub fn quiz_call(topic: Option<&str>) -> ChatCall {
    let theme = match topic {
        Some(t) if !t.trim().is_empty() => format!("The questions must be about: '{t}'."),
        _ => "Pick fun everyday themes children know well.".to_string(),
    };
    let system = format!(
        "You create emoji quizzes for Korean children learning how to describe things \
precisely. Each question shows a short emoji sequence; the child picks the phrase the \
emojis depict. {theme} All options and explanations must be in Korean and age-appropriate. \
{contract} Each question object must have the keys \"emojis\" (the emoji sequence as one \
string), \"options\" (a list of exactly {options} Korean phrases), \"correctIndex\" (the \
0-based index of the right option) and \"explanation\" (one short Korean sentence).",
        contract = schema::QUIZ.clause(),
        options = schema::QUIZ_OPTIONS,
    );
    ChatCall {
        system,
        parts: vec![ContentPart::Text("Please generate the quiz now.".into())],
        json_mode: true,
        ..Default::default()
    }
}

pub fn puzzle_call(level_count: usize) -> ChatCall {
    let per_type = schema::BLOCKS_PER_TYPE;
    let system = format!(
        "You design sentence-building puzzle levels for Korean children learning prompt \
writing. Your response MUST be a valid JSON object with a single key \"levels\": a list of \
exactly {level_count} level objects. Each level object must have the keys \"theme\" (a short \
Korean theme), \"prompt_kr\" (one natural Korean sentence combining a subject, an action and \
a location), \"availableBlocks\" (a list of block objects {{\"text\", \"type\"}} where \
\"type\" is \"subject\", \"action\" or \"location\", with exactly {per_type} blocks per \
type) and \"correctBlocks\" (a list of the 3 block texts, one per type in the order subject, \
action, location, that appear verbatim in \"prompt_kr\"). Every correct block text MUST be \
copied exactly from \"availableBlocks\" and MUST occur inside \"prompt_kr\". All text must \
be Korean and age-appropriate."
    );
    ChatCall {
        system,
        parts: vec![ContentPart::Text(format!(
            "Please generate {level_count} puzzle levels now."
        ))],
        json_mode: true,
        ..Default::default()
    }
}

/// Render the three Korean puzzle pieces as one English scene phrase. Output
/// is the phrase itself, not JSON.
pub fn puzzle_scene_call(prompt_kr: &str, subject: &str, action: &str, location: &str) -> ChatCall {
    let system = "You translate a Korean scene into one short English phrase for an image \
generator. Combine the subject, the action and the location into a single natural phrase, \
lowercase, no trailing period. Respond ONLY with the phrase."
        .to_string();
    ChatCall {
        system,
        parts: vec![ContentPart::Text(format!(
            "Korean sentence: '{prompt_kr}'\nSubject: '{subject}'\nAction: '{action}'\nLocation: '{location}'"
        ))],
        max_tokens: Some(60),
        ..Default::default()
    }
}

pub fn puzzle_image_prompt(scene: &str) -> String {
    format!("{ILLUSTRATION_ANCHOR} {scene}, isolated on a plain white background")
}
