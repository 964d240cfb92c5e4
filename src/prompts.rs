//! User-facing replies and normalizer prompt templates
//!
//! Everything the service says or asks an LLM lives here, so wording can
//! change without touching the state machine.

// ============================================================================
// Replies
// ============================================================================

/// Sent once when a connection opens
pub const GREETING: &str = "안녕하세요, 어디로 가고 싶으세요?";

pub const ASK_DESTINATION_AGAIN: &str =
    "죄송합니다. 목적지를 잘 알아듣지 못했어요. 어디로 가고 싶으신지 다시 말씀해 주세요.";

pub const RESTATE_DESTINATION: &str = "죄송합니다. 다시 목적지를 말씀해 주세요.";

pub const ASK_BRANCH_AGAIN: &str = "죄송합니다. 어느 지점으로 가시는지 다시 말씀해 주세요.";

pub const ASK_EXIT_AGAIN: &str = "죄송합니다. 몇 번 출구로 가시는지 숫자로 다시 말씀해 주세요.";

pub const NOT_UNDERSTOOD: &str = "응답을 이해하지 못했습니다. '네' 또는 '아니오'로 대답해 주세요.";

pub fn confirm_destination(destination: &str) -> String {
    format!("{destination}(이)가 맞을까요?")
}

pub fn ask_branch(destination: &str) -> String {
    format!("{destination}(이)가 맞나요? 지점을 말해주실 수 있나요?")
}

pub fn ask_exit(destination: &str) -> String {
    format!("{destination}(이)가 맞나요? 몇 번 출구로 가시나요?")
}

pub fn start_search(destination: &str) -> String {
    format!("목적지 {destination}(으)로 정확한 위치 검색을 시작하겠습니다.")
}

pub fn already_confirmed(destination: &str) -> String {
    format!("이미 목적지가 {destination}(으)로 확정되었습니다.")
}

// ============================================================================
// Normalizer prompts
// ============================================================================

const DESTINATION_PROMPT: &str = r#"다음 텍스트는 택시 앱에서 사용자가 말한 목적지입니다.
이 텍스트에 다음 작업을 수행해 목적지 출력을 완료해주세요.

1. 문맥 확인: 목적지와 관련이 없거나 의미가 불분명한 부분, 맥락이 어색한 부분이 있다면 수정해 주세요.
2. 발음 교정: 발음이 어눌하거나, 맥락에 맞지 않게 센 발음이거나, 잘못된 부분이 있다면 올바르게 수정해 주세요.
3. 목적지 단어 추출: 목적지에 해당하는 단어만 추출해 주세요. 예를 들어, "서울역에 가고 싶어"에서는 "서울역"만 추출합니다.
4. 체인점 지점 확인: 만약 목적지가 체인점(예: 스타벅스, 맥도날드 등)이고 지점을 언급했다면, 체인점 이름과 지점 정보를 모두 포함해 주세요. 예를 들어, "강남역 근처 스타벅스"는 "스타벅스 강남역점"으로 응답해 주세요.
5. 단어 중복 방지: 목적지 단어를 중복하지 말고, 정확하게 추출된 단어만 응답해 주세요.
6. 목적지를 찾을 수 없다면 "{sentinel}"이라고만 응답해 주세요.
7. 응답 형식: 최종 목적지 단어만 명확하게 제공해 주세요. 예를 들어, "추출된 목적지: 봉대박 파스타"는 "봉대박 파스타"로 응답해 주세요.

원본 텍스트: {text}

보정된 목적지:"#;

const BRANCH_PROMPT: &str = r#"다음 텍스트는 택시 앱 사용자가 체인점 "{destination}"의 지점을 말한 것입니다.
발음이 어눌하거나 잘못된 부분을 바로잡고, 지점 이름만 추출해 주세요.
예를 들어, "강남역 쪽에 있는 데요"는 "강남역점"으로 응답해 주세요.
지점을 찾을 수 없다면 "{sentinel}"이라고만 응답해 주세요.

원본 텍스트: {text}

지점:"#;

const EXIT_PROMPT: &str = r#"다음 텍스트는 택시 앱 사용자가 지하철역 "{destination}"의 출구 번호를 말한 것입니다.
한글로 말한 숫자도 아라비아 숫자로 바꾸어, "N번 출구" 형식으로만 응답해 주세요.
예를 들어, "삼번 출구요"는 "3번 출구"로 응답해 주세요.
출구 번호를 찾을 수 없다면 "{sentinel}"이라고만 응답해 주세요.

원본 텍스트: {text}

출구:"#;

pub fn destination_prompt(text: &str, sentinel: &str) -> String {
    DESTINATION_PROMPT
        .replace("{sentinel}", sentinel)
        .replace("{text}", text)
}

pub fn branch_prompt(destination: &str, text: &str, sentinel: &str) -> String {
    BRANCH_PROMPT
        .replace("{destination}", destination)
        .replace("{sentinel}", sentinel)
        .replace("{text}", text)
}

pub fn exit_prompt(destination: &str, text: &str, sentinel: &str) -> String {
    EXIT_PROMPT
        .replace("{destination}", destination)
        .replace("{sentinel}", sentinel)
        .replace("{text}", text)
}
