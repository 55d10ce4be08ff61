/*
Run with:
    an ONNX export of RobBERT's masked-language head as robbert.onnx
    and its tokenizer.json next to it, then
    cargo run --example usage
*/

use diedat_rs::DieDat;

fn main() -> anyhow::Result<()> {
    let model_path = "robbert.onnx";
    let tokenizer_path = "tokenizer.json";

    let diedat = DieDat::new(model_path, tokenizer_path)?;

    let text = "Het boek _die_ ik gisteren las, was spannend.";
    let prediction = diedat.predict(text)?;

    println!("Input: {}", text);
    println!(
        "Output: {} ({:?}, confidence {:.2})",
        prediction.rating.as_str(),
        prediction.interpretation,
        prediction.confidence
    );

    Ok(())
}
