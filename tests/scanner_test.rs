use yaml_core::{Scanner, ScannerError, Token, TokenStatus, TokenType, YamlError};

fn types(source: &str) -> Vec<TokenType> {
    Scanner::new(source)
        .tokenize()
        .unwrap()
        .into_iter()
        .map(|t| t.ttype)
        .collect()
}

#[test]
fn test_flow_sequence_token_order() {
    let types = types("[1,2]");
    assert_eq!(
        types,
        vec![
            TokenType::StreamStart,
            TokenType::FlowSeqStart,
            TokenType::PlainScalar("1".into()),
            TokenType::FlowEntry,
            TokenType::PlainScalar("2".into()),
            TokenType::FlowSeqEnd,
            TokenType::StreamEnd,
        ]
    );
}

#[test]
fn test_block_end_balance() {
    let sources = [
        "",
        "a: 1\nb: 2\n",
        "a:\n  b:\n    c: d\n",
        "- a\n- - b\n  - c\n- d: e\n  f: g\n",
        "x:\n- 1\n- 2\ny: z\n",
        "? complex\n: value\n",
        "top: [a, {b: c}]\nnext:\n  deep: {x: [1, 2]}\n",
        "--- \na: 1\n",
        "---\na: 1\n---\n- b\n...\n",
        "a: 1\n  # indented comment\nb: 2",
        "one\ntwo\n",
        "k: 'multi\n  line'\nl: m\n",
    ];
    for source in sources {
        let tokens = Scanner::new(source)
            .tokenize()
            .unwrap_or_else(|err| panic!("{source:?}: {err:?}"));
        let starts = tokens
            .iter()
            .filter(|t| matches!(t.ttype, TokenType::BlockSeqStart | TokenType::BlockMapStart))
            .count();
        let ends = tokens
            .iter()
            .filter(|t| t.ttype == TokenType::BlockEnd)
            .count();
        assert_eq!(starts, ends, "for {source:?}");
    }
}

#[test]
fn test_implicit_key_on_document_marker_line() {
    let err = Scanner::new("--- a: 1\n").tokenize().unwrap_err();
    assert!(
        matches!(err, YamlError::Scanner(ScannerError::UnrecognizedToken { found: ':', .. })),
        "{err:?}"
    );
}

#[test]
fn test_only_confirmed_tokens_are_delivered() {
    let source = "a: b\nc: [d, e: f]\n? g\n: h\n- broken: layout\n";
    let statuses: Vec<TokenStatus> = Scanner::new(source)
        .filter_map(Result::ok)
        .map(|t| t.status)
        .collect();
    assert!(!statuses.is_empty());
    assert!(statuses.iter().all(|s| *s == TokenStatus::Confirmed));
}

#[test]
fn test_stream_framing() {
    let tokens: Vec<Token> = Scanner::new("a").tokenize().unwrap();
    assert_eq!(tokens.first().map(|t| &t.ttype), Some(&TokenType::StreamStart));
    assert_eq!(tokens.last().map(|t| &t.ttype), Some(&TokenType::StreamEnd));

    let mut scanner = Scanner::new("a");
    scanner.tokenize().unwrap();
    assert!(scanner.get_next_token().unwrap().is_none());
}

#[test]
fn test_positions_are_zero_based() {
    let tokens = Scanner::new("a:\n  b: c").tokenize().unwrap();
    let b = tokens
        .iter()
        .find(|t| t.ttype == TokenType::PlainScalar("b".into()))
        .unwrap();
    assert_eq!((b.mark.line, b.mark.column, b.mark.index), (1, 2, 5));
}

#[test]
fn test_error_mid_scan_drops_partial_state() {
    let mut scanner = Scanner::new("a: [x, 'y\n");
    let result = scanner.tokenize();
    assert!(matches!(result, Err(YamlError::Scanner(_))));
    // once failed, the iterator yields nothing further
    assert!(scanner.next().is_none());
}
