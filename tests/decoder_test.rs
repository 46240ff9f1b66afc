//! Tests for Decoder and Statistics

use rstest::rstest;

use msgtree::domain::{
    round1, Decoder, DomainError, MsgTree, Statistics, TrailingPolicy, TreeBuilder,
};

fn tree(shape: &str) -> MsgTree {
    TreeBuilder::new().build(shape).unwrap()
}

// ============================================================
// Decoding
// ============================================================

#[rstest]
#[case("^^ab^cd", "00011011", "abcd")]
#[case("^a^^!^dc^rb", "0111110010110101001111100100", "abracadabra!")]
#[case("^^ ^el^^h^wo^r^d!", "1000100110111011001010101111001111101111", "hello world!")]
#[case("^^a\n^bc", "0001101100", "a\nbca")]
fn given_valid_bits_when_decoding_then_message_restored(
    #[case] shape: &str,
    #[case] bits: &str,
    #[case] expected: &str,
) {
    // Arrange
    let t = tree(shape);

    // Act
    let decoded = Decoder::new(&t).decode(bits).unwrap();

    // Assert
    assert_eq!(decoded.message, expected);
    assert_eq!(decoded.stats.encoded_bits, bits.len());
    assert_eq!(decoded.stats.total_characters, expected.chars().count());
}

#[test]
fn given_bit_into_missing_child_when_decoding_then_malformed_with_position() {
    let t = tree("^^ab");

    let err = Decoder::new(&t).decode("000110").unwrap_err();

    assert_eq!(
        err,
        DomainError::MalformedBitstream {
            position: 4,
            decoded: 2
        }
    );
}

#[test]
fn given_single_leaf_tree_when_decoding_then_first_bit_is_malformed() {
    let t = tree("x");

    let err = Decoder::new(&t).decode("1").unwrap_err();

    assert_eq!(
        err,
        DomainError::MalformedBitstream {
            position: 0,
            decoded: 0
        }
    );
}

#[rstest]
#[case("0a01", 1, 'a')]
#[case("0 1", 1, ' ')]
#[case("012", 2, '2')]
fn given_non_binary_character_when_decoding_then_invalid_bit(
    #[case] bits: &str,
    #[case] position: usize,
    #[case] found: char,
) {
    let t = tree("^ab");

    let err = Decoder::new(&t).decode(bits).unwrap_err();

    assert_eq!(err, DomainError::InvalidBit { position, found });
}

#[test]
fn given_empty_bit_string_when_decoding_then_invalid_input() {
    let t = tree("^ab");

    let err = Decoder::new(&t).decode("").unwrap_err();

    assert!(matches!(err, DomainError::InvalidInput(_)));
}

#[test]
fn given_partial_path_when_strict_then_trailing_bits_error() {
    let t = tree("^a^^!^dc^rb");

    // "a", "b", then "10" stops inside the right subtree
    let err = Decoder::new(&t).decode("011110").unwrap_err();

    assert_eq!(
        err,
        DomainError::TrailingBits {
            position: 4,
            decoded: 2
        }
    );
}

#[test]
fn given_partial_path_when_lenient_then_dropped_and_counted() {
    let t = tree("^a^^!^dc^rb");

    let decoded = Decoder::new(&t)
        .with_trailing(TrailingPolicy::Lenient)
        .decode("011110")
        .unwrap();

    assert_eq!(decoded.message, "ab");
    assert_eq!(decoded.stats.encoded_bits, 6);
    assert_eq!(decoded.stats.total_characters, 2);
}

#[test]
fn given_only_partial_path_when_lenient_then_empty_message_and_na_stats() {
    let t = tree("^^ab^cd");

    let decoded = Decoder::new(&t)
        .with_trailing(TrailingPolicy::Lenient)
        .decode("1")
        .unwrap();

    assert_eq!(decoded.message, "");
    assert_eq!(decoded.stats.avg_bits_per_char(), None);
    assert!(decoded.stats.to_string().contains("Avg bits/char: n/a"));
}

// ============================================================
// Streaming
// ============================================================

#[test]
fn given_bit_iterator_when_streaming_then_symbols_arrive_per_leaf() {
    let t = tree("^^ab^cd");
    let decoder = Decoder::new(&t);

    let mut symbols = decoder.symbols("00011011".chars());

    assert_eq!(symbols.next(), Some(Ok('a')));
    assert_eq!(symbols.decoded(), 1);
    assert_eq!(symbols.next(), Some(Ok('b')));
    let rest: Result<String, _> = symbols.collect();
    assert_eq!(rest.unwrap(), "cd");
}

#[test]
fn given_error_mid_stream_when_streaming_then_prefix_is_kept_and_iterator_stops() {
    let t = tree("^^ab");

    let mut symbols = Decoder::new(&t).symbols("000111".chars());

    assert_eq!(symbols.next(), Some(Ok('a')));
    assert_eq!(symbols.next(), Some(Ok('b')));
    assert_eq!(
        symbols.next(),
        Some(Err(DomainError::MalformedBitstream {
            position: 4,
            decoded: 2
        }))
    );
    assert_eq!(symbols.next(), None);
    assert_eq!(symbols.next(), None);
}

// ============================================================
// Statistics
// ============================================================

#[rstest]
#[case("^^ab^cd", "00011011", 2.0, 87.5)]
#[case("^a^^!^dc^rb", "0111110010110101001111100100", 2.3, 85.4)]
#[case("^^ ^el^^h^wo^r^d!", "1000100110111011001010101111001111101111", 3.3, 79.2)]
fn given_decoded_message_when_reporting_then_rounded_figures(
    #[case] shape: &str,
    #[case] bits: &str,
    #[case] avg: f64,
    #[case] saving: f64,
) {
    let t = tree(shape);

    let stats = Decoder::new(&t).decode(bits).unwrap().stats;

    assert_eq!(stats.avg_bits_per_char().map(round1), Some(avg));
    assert_eq!(stats.space_saving_percent().map(round1), Some(saving));
}

#[rstest]
#[case("^^ab^cd", "00011011")]
#[case("^a^^!^dc^rb", "0111110010110101001111100100")]
#[case("^^ ^el^^h^wo^r^d!", "1000100110111011001010101111001111101111")]
#[case("^^a\n^bc", "0001101100")]
fn given_decoded_message_when_scaling_average_then_bit_count_recovered(
    #[case] shape: &str,
    #[case] bits: &str,
) {
    let t = tree(shape);

    let stats = Decoder::new(&t).decode(bits).unwrap().stats;

    let recovered = stats.avg_bits_per_char().unwrap() * stats.total_characters as f64;
    assert!((recovered - stats.encoded_bits as f64).abs() < 1e-9);
}

#[rstest]
#[case(721, 125, "Avg bits/char: 5.8\nTotal Characters: 125\nSpace Saving: 63.9%")]
#[case(733, 125, "Avg bits/char: 5.9\nTotal Characters: 125\nSpace Saving: 63.3%")]
#[case(1, 4, "Avg bits/char: 0.3\nTotal Characters: 4\nSpace Saving: 98.4%")]
#[case(28, 12, "Avg bits/char: 2.3\nTotal Characters: 12\nSpace Saving: 85.4%")]
fn given_figures_near_rounding_boundary_when_displaying_then_decimal_half_up(
    #[case] encoded_bits: usize,
    #[case] total_characters: usize,
    #[case] expected: &str,
) {
    let stats = Statistics::new(encoded_bits, total_characters);

    assert_eq!(stats.to_string(), expected);
}

#[test]
fn given_any_stats_when_comparing_figures_then_saving_follows_average() {
    let stats = Statistics::new(28, 12);

    let avg = stats.avg_bits_per_char().unwrap();
    let saving = stats.space_saving_percent().unwrap();

    assert!((saving - (1.0 - avg / 16.0) * 100.0).abs() < 1e-9);
}

#[test]
fn given_custom_baseline_when_decoding_then_saving_uses_it() {
    let t = tree("^^ab^cd");

    let stats = Decoder::new(&t)
        .with_baseline_bits(8)
        .decode("00011011")
        .unwrap()
        .stats;

    assert_eq!(stats.baseline_bits, 8);
    assert_eq!(stats.space_saving_percent(), Some(75.0));
}

#[test]
fn given_wide_single_char_code_when_reporting_then_saving_is_negative() {
    let stats = Statistics::new(20, 1);

    assert_eq!(
        stats.to_string(),
        "Avg bits/char: 20.0\nTotal Characters: 1\nSpace Saving: -25.0%"
    );
}
