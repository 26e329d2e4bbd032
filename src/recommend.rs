//! Meal recommendations
//!
//! Fixed pools of Korean meal suggestions, one per dataset profile; every
//! record carries a few, drawn without replacement.

use rand::seq::SliceRandom;
use rand::Rng;

use crate::types::DatasetProfile;

/// Default number of recommendations per record
pub const DEFAULT_RECOMMEND_COUNT: usize = 3;

/// Recommendation pool, grouped by dietary focus
pub const MEAL_POOL: &[&str] = &[
    // Balanced
    "현미밥과 된장찌개, 구운 생선, 채소 모듬",
    "통밀빵 아보카도 토스트와 그릭 요거트",
    "퀴노아 샐러드와 닭가슴살",
    "연어 스테이크와 찐 브로콜리, 현미",
    "토마토 달걀 볶음과 잡곡밥",
    "두부 채소 덮밥",
    "닭가슴살 감자 구이와 샐러드",
    "오트밀과 과일, 견과류",
    "참치 야채 비빔밥",
    "통밀 파스타와 토마토 소스, 그린 샐러드",
    "버섯 리소토와 그린 샐러드",
    "쌀국수와 채소, 저지방 육수",
    "삼색 채소 쌈밥과 들깨탕",
    "모듬 해산물 스프와 통밀 빵",
    "닭가슴살 야채 카레와 현미밥",
    // Weight management
    "곤약 야채 볶음밥",
    "닭가슴살 샐러드와 통밀빵",
    "두부 스크램블과 야채 스틱",
    "현미밥과 버섯 두부 볶음",
    "오이 토마토 달걀 샌드위치",
    "단호박 영양 스튜",
    "해초 두부 샐러드",
    "채소 프리타타",
    "배추 닭가슴살 쌈",
    "시금치 달걀찜과 잡곡밥",
    "곤약 비빔국수",
    "오이 냉국과 콩나물밥",
    "닭가슴살 샐러드 랩",
    "훈제 연어 아보카도 샐러드",
    "저탄수화물 스크램블 에그와 야채",
    // Muscle
    "소고기 두부 스테이크와 찐 채소",
    "닭가슴살 도시락 (채소, 현미 포함)",
    "연어 아보카도 덮밥",
    "삶은 계란 2개와 샐러드, 통곡물빵",
    "우유 단백질 스무디와 견과류",
    "돼지고기 김치찌개와 잡곡밥",
    "콩비지찌개와 현미밥",
    "달걀 샌드위치와 그릭 요거트",
    "닭가슴살 카레라이스",
    "고등어구이와 두부 된장국, 채소 무침",
    "소고기 미역국과 현미밥",
    "닭가슴살 브로콜리 볶음밥",
    "참치 통조림 샐러드와 고구마",
    "그릭 요거트 블루베리 프로틴 볼",
    "렌틸콩 닭가슴살 수프",
    // Hydration
    "수박 키위 요거트 볼",
    "오이 냉국과 잡곡밥",
    "토마토 오이 샐러드와 닭가슴살",
    "미역오이냉국과 현미밥",
    "수박 오이 스무디",
    "열무 냉국과 보리밥",
    "토마토 계란 수프",
    "미역 무 냉국과 오이무침",
    "콩나물 국밥과 오이 김치",
    "참외 오이 주스와 통곡물빵",
    "오이 토마토 냉스프",
    "백김치 물냉면",
    "수박 블루베리 스무디 볼",
    "오이 우엉 냉채와 보리밥",
    "토마토 셀러리 주스와 치아씨드",
    // Protein
    "소고기 채소 볶음과 현미밥",
    "닭가슴살 튀김 없는 치킨 샐러드",
    "참치 삶은 달걀 샐러드와 통밀빵",
    "두부 깻잎 구이와 채소 쌈",
    "돼지고기 불고기와 야채볶음",
    "소고기 콩나물 국밥",
    "그릭 요거트와 견과류, 과일",
    "계란 아보카도 토스트",
    "연어 스크램블 에그와 현미밥",
    "치킨 브로콜리 볶음밥",
    "콩가루 두부 부침과 버섯볶음",
    "계란 닭가슴살 김밥",
    "훈제 오리 샐러드",
    "소고기 콩나물 덮밥",
    "콩 견과류 에너지바와 그릭요거트",
    // Blood pressure
    "현미밥과 가지 된장찌개, 청경채 볶음",
    "토마토 오이 샐러드와 등푸른 생선구이",
    "당근 시금치 스무디와 통곡물빵",
    "마늘 버섯 영양밥과 두부국",
    "삼겹살 대신 안심 구이와 채소",
    "현미밥과 버섯 들깨탕",
    "저염 된장국과 청국장, 잡곡밥",
    "콩나물 무침과 두부조림, 잡곡밥",
    "시금치 달걀 볶음밥",
    "호두 바나나 오트밀",
    "오트밀 고구마죽",
    "양파 마늘 팽이버섯 구이",
    "저염 연두부 비지찌개",
    "호박고구마 채소 스튜",
    "검은콩 수수밥과 시래기국",
    // Immunity
    "마늘 생강 홍삼 영양밥",
    "달래 시금치 두부 된장국",
    "표고버섯 영지버섯 약선탕",
    "생강차와 견과류 오트밀",
    "도라지 배 생강 차와 통밀빵",
    "토마토 마늘 닭가슴살 수프",
    "브로콜리 마늘 볶음과 현미밥",
    "양배추 당근 도라지 샐러드",
    "홍삼 대추 영양밥과 된장국",
    "녹황색 채소 과일 스무디",
    "단호박 닭가슴살 영양찜",
    "연근 우엉 연어구이",
    "고구마 잣 죽",
    "발효식품 모듬(요거트, 김치, 청국장)",
    "오메가3 풍부한 견과류와 과일 샐러드",
    // Energy
    "견과류 아보카도 오트밀",
    "바나나 단호박 스무디",
    "고구마밥과 단호박찜",
    "퀴노아 영양밥과 된장국",
    "바나나 땅콩버터 통밀 토스트",
    "귀리 요거트 파르페",
    "치아시드 아사이 스무디",
    "단호박 꿀고구마 샐러드",
    "블루베리 바나나 오트밀",
    "꿀 생강차와 잣 호두 간식",
    "바나나 브라운라이스 샐러드",
    "단호박 연근 찜",
    "고구마 콩 에너지바",
    "귀리 바나나 팬케이크",
    "다크초콜릿 견과류 그래놀라",
    // Heart health
    "연어 아몬드 샐러드",
    "오메가3 풍부한 등푸른 생선구이",
    "호두 아마씨드 오트밀",
    "올리브오일 채소 구이",
    "아보카도 토마토 달걀 샐러드",
    "베리류 요거트 파르페",
    "다크 초콜릿 견과류 그래놀라",
    "귀리 아마씨드 스무디",
    "카카오닙스 바나나 요거트",
    "올리브오일 마늘 토마토 파스타",
    "견과류 블루베리 샐러드",
    "아보카도 연어 샌드위치",
    "검은콩 퀴노아 샐러드",
    "시금치 아몬드 연어구이",
    "토마토 마늘 스크램블에그",
    // Digestion
    "발효 요거트와 과일, 견과류",
    "오트밀 바나나 생강차",
    "파파야 요거트 스무디",
    "발효 김치와 현미밥",
    "된장찌개와 무채 나물",
    "코코넛워터 바나나 스무디",
    "키위 파인애플 요거트",
    "브로콜리 스프와 통밀빵",
    "생강 레몬 허브티와 크래커",
    "파파야 리치 과일 샐러드",
    "케일 파인애플 스무디",
    "양배추 사과 주스",
    "청국장과 곤드레나물밥",
    "물김치와 고구마밥",
    "프로바이오틱스 요거트 볼",
];

/// Everyday meals recommended alongside steady records
pub const STEADY_MEAL_POOL: &[&str] = &[
    "연어와 퀴노아 샐러드",
    "팥 현미밥과 된장국",
    "흑임자 연두부",
    "잡곡밥과 버섯전골",
    "삼치구이와 된장찌개",
    "호두 사과 샐러드",
    "북어 야채죽",
    "고등어 조림과 현미밥",
    "표고버섯 들깨탕",
    "더덕구이와 보리밥",
    "우엉차와 녹두죽",
    "메밀국수와 두부 김무침",
    "낙지 연포탕",
    "통밀빵과 블루베리 요거트",
    "오리 훈제와 현미밥",
    "두부 스테이크",
    "잡곡밥과 된장국",
    "견과류 샐러드",
    "닭가슴살 샐러드",
    "퀴노아 샐러드",
    "구운 연어와 브로콜리",
    "현미밥과 갈치구이",
    "토마토 달걀 샐러드",
    "참치 아보카도 덮밥",
    "곤약 냉면",
    "콩나물국과 보리밥",
    "토마토 두부 샐러드",
    "단호박 영양밥",
    "오트밀 요거트",
    "연근 우엉차",
    "삶은 달걀과 아보카도 토스트",
    "그릭 요거트와 견과류",
    "닭가슴살 현미 덮밥",
    "감자 닭가슴살 수프",
    "시금치 달걀 프리타타",
    "고구마 현미밥",
    "연어 아보카도 샐러드",
    "해초 두부 무침",
    "버섯 영양밥",
    "소고기 야채 볶음",
    "통곡물 크래커와 훈제연어",
    "렌틸콩 수프",
    "검은콩 퀴노아 볼",
    "브로콜리 치즈 구이",
    "흰살생선 스튜",
    "토마토 바질 계란찜",
    "팽이버섯 두부 국",
    "쪽파 달걀말이",
    "청국장과 보리밥",
    "콜리플라워 볶음밥",
    "달래 된장국",
    "고사리 나물과 오곡밥",
    "병아리콩 샐러드",
    "참치 김밥",
    "김치 닭가슴살 볶음밥",
    "닭고기 야채 수프",
    "블루베리 그릭요거트 파르페",
    "달걀 현미 리조또",
    "바나나 아몬드 스무디",
    "쇠고기 미역국",
    "키위 그릭요거트",
    "돼지고기 생姜焼き(쇼가야키)",
    "연두부 부추 무침",
    "황태 콩나물국",
    "두부 김치 볶음",
    "차돌박이 샐러드",
    "시금치 프로틴 스무디",
    "닭가슴살 김치찌개",
    "콩나물 얼갈이 된장국",
    "우유 오트밀 죽",
    "미역 냉국",
    "계란 토마토 볶음밥",
    "꽁치 무조림",
    "양배추 달걀 샐러드",
    "삼계탕",
    "치아씨드 요거트 볼",
    "바나나 땅콩버터 통밀 토스트",
    "단호박 스프",
    "황태 콩나물 해장국",
    "타이 치킨 샐러드",
    "현미 채소 영양밥",
    "홍합 미역국",
    "참치 계란 샌드위치",
    "두부 채소 냉국",
    "새우 아보카도 롤",
    "통밀 파스타 샐러드",
    "계란 고구마 샐러드",
    "연어 구이와 찐 채소",
    "닭가슴살 데리야끼 덮밥",
    "해산물 토마토 스튜",
    "두부 샐러드와 참깨 드레싱",
    "오이 냉국",
    "닭고기 야채 카레",
    "시금치 리코타 오믈렛",
    "단호박 닭가슴살 구이",
    "연어 크림 파스타",
];

/// Pool recommendations are drawn from for a profile
pub fn meal_pool(profile: DatasetProfile) -> &'static [&'static str] {
    match profile {
        DatasetProfile::Anomalous => MEAL_POOL,
        DatasetProfile::Steady => STEADY_MEAL_POOL,
    }
}

/// Draw `count` distinct recommendations from `pool`
pub fn recommend<R: Rng + ?Sized>(rng: &mut R, pool: &[&str], count: usize) -> Vec<String> {
    pool.choose_multiple(rng, count)
        .map(|meal| meal.to_string())
        .collect()
}

/// First `count` entries of [`MEAL_POOL`], for records built without
/// randomness
pub fn first_meals(count: usize) -> Vec<String> {
    MEAL_POOL.iter().take(count).map(|m| m.to_string()).collect()
}
